//! Rotation helpers shared by the grid generator, trim and structural solvers.
//!
//! Frames: `G` inertial, `A` body (reference frame of the beam), `B` local
//! cross-section frame of a beam node.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// Rotation matrix `C_AB` from a Cartesian rotation vector (exponential map).
pub fn crv2rot(psi: &Vector3<f64>) -> Matrix3<f64> {
    Rotation3::new(*psi).into_inner()
}

/// Rotation about the local x axis.
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner()
}

/// Rotation about the local z axis.
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle).into_inner()
}

/// Body orientation from roll, pitch (angle of attack) and yaw (sideslip).
pub fn euler2quat(roll: f64, alpha: f64, beta: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll, alpha, beta)
}

/// Signed angle that rotates `from` onto `to` about +z, ignoring z components.
pub fn in_plane_angle(from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
    let a = Vector3::new(from.x, from.y, 0.0);
    let b = Vector3::new(to.x, to.y, 0.0);
    let cross_z = a.x * b.y - a.y * b.x;
    cross_z.atan2(a.dot(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn crv_about_z_maps_x_to_y() {
        let c = crv2rot(&Vector3::new(0.0, 0.0, FRAC_PI_2));
        let y = c * Vector3::x();
        assert!((y - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn zero_crv_is_identity() {
        assert_eq!(crv2rot(&Vector3::zeros()), Matrix3::identity());
    }

    #[test]
    fn in_plane_angle_is_signed() {
        let x = Vector3::x();
        assert!((in_plane_angle(&x, &Vector3::y()) - FRAC_PI_2).abs() < 1e-12);
        assert!((in_plane_angle(&x, &-Vector3::y()) + FRAC_PI_2).abs() < 1e-12);
        assert!((in_plane_angle(&x, &-x).abs() - PI).abs() < 1e-12);
        // z components are ignored
        let tilted = Vector3::new(1.0, 0.0, 5.0);
        assert!(in_plane_angle(&x, &tilted).abs() < 1e-12);
    }

    #[test]
    fn pitch_quaternion_tilts_x_axis() {
        let q = euler2quat(0.0, 0.1, 0.0);
        let x = q * Vector3::x();
        assert!(x.y.abs() < 1e-12);
        assert!((x.z + 0.1_f64.sin()).abs() < 1e-12);
    }
}
