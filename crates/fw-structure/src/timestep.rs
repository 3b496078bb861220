//! Structural state snapshot at one time index.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::model::BeamModel;
use fw_core::NodeId;

pub type Vector6 = nalgebra::Vector6<f64>;

/// Snapshot of the structural state at one time index.
///
/// Array lengths are fixed by the beam model for the whole run; only values
/// change between sub-iterations and steps.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralTimeStep {
    /// Nodal positions in the body frame `A`.
    pub pos: Vec<Vector3<f64>>,
    pub pos_dot: Vec<Vector3<f64>>,
    pub pos_ddot: Vec<Vector3<f64>>,
    /// Cartesian rotation vectors per element and local node.
    pub psi: Vec<Vec<Vector3<f64>>>,
    pub psi_dot: Vec<Vec<Vector3<f64>>>,
    /// Orientation of `A` with respect to `G`.
    pub quat: UnitQuaternion<f64>,
    /// Reference-frame position/velocity/acceleration (3 linear + 3 angular).
    pub for_pos: Vector6,
    pub for_vel: Vector6,
    pub for_acc: Vector6,
    /// Nodal loads in `A`: 3 force + 3 moment components.
    pub steady_applied_forces: Vec<Vector6>,
    pub unsteady_applied_forces: Vec<Vector6>,
}

impl StructuralTimeStep {
    /// Undeformed, unloaded state of a beam.
    pub fn initial(model: &BeamModel) -> Self {
        let n = model.num_nodes();
        let psi = model.psi_ini();
        let psi_dot = psi.iter().map(|e| vec![Vector3::zeros(); e.len()]).collect();
        Self {
            pos: model.pos_ini().to_vec(),
            pos_dot: vec![Vector3::zeros(); n],
            pos_ddot: vec![Vector3::zeros(); n],
            psi,
            psi_dot,
            quat: UnitQuaternion::identity(),
            for_pos: Vector6::zeros(),
            for_vel: Vector6::zeros(),
            for_acc: Vector6::zeros(),
            steady_applied_forces: vec![Vector6::zeros(); n],
            unsteady_applied_forces: vec![Vector6::zeros(); n],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.pos.len()
    }

    /// Rotation matrix `C_GA` (body to inertial).
    pub fn cga(&self) -> Matrix3<f64> {
        self.quat.to_rotation_matrix().into_inner()
    }

    /// Rotation matrix `C_AG` (inertial to body).
    pub fn cag(&self) -> Matrix3<f64> {
        self.cga().transpose()
    }

    /// Current rotation vector of a node, taken from its master element.
    pub fn node_psi(&self, model: &BeamModel, node: NodeId) -> Vector3<f64> {
        let (elem, local) = model.node_master_elem(node);
        self.psi[elem.idx()][local]
    }

    pub fn zero_applied_forces(&mut self) {
        self.steady_applied_forces.fill(Vector6::zeros());
        self.unsteady_applied_forces.fill(Vector6::zeros());
    }

    /// Name of the first state field holding a non-finite value, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        fn vecs_finite(v: &[Vector3<f64>]) -> bool {
            v.iter().all(|x| x.iter().all(|c| c.is_finite()))
        }
        if !vecs_finite(&self.pos) {
            return Some("pos");
        }
        if !vecs_finite(&self.pos_dot) {
            return Some("pos_dot");
        }
        if !self.psi.iter().all(|e| vecs_finite(e)) {
            return Some("psi");
        }
        if !self.psi_dot.iter().all(|e| vecs_finite(e)) {
            return Some("psi_dot");
        }
        if !self.quat.coords.iter().all(|c| c.is_finite()) {
            return Some("quat");
        }
        None
    }

    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Advance the reference-frame position with its current velocity.
    ///
    /// The linear part is integrated in `G`, the angular part component-wise.
    pub fn integrate_position(&mut self, dt: f64) {
        let lin_a = Vector3::new(self.for_vel[0], self.for_vel[1], self.for_vel[2]);
        let lin_g = self.cga() * lin_a;
        for i in 0..3 {
            self.for_pos[i] += dt * lin_g[i];
            self.for_pos[i + 3] += dt * self.for_vel[i + 3];
        }
    }

    /// Sum of steady and unsteady loads at a node.
    pub fn total_applied(&self, node: usize) -> Vector6 {
        self.steady_applied_forces[node] + self.unsteady_applied_forces[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BeamBuilder, BoundaryCode};

    fn beam() -> BeamModel {
        let mut b = BeamBuilder::new();
        let n0 = b.add_node(Vector3::zeros(), BoundaryCode::CLAMPED);
        let n1 = b.add_node(Vector3::new(0.0, 1.0, 0.0), BoundaryCode::FREE_END);
        b.add_element(vec![n0, n1], vec![0, 1], vec![Vector3::new(0.0, 0.0, 0.3); 2]);
        b.build().unwrap()
    }

    #[test]
    fn initial_state_matches_model() {
        let model = beam();
        let ts = StructuralTimeStep::initial(&model);
        assert_eq!(ts.num_nodes(), 2);
        assert_eq!(ts.pos[1], Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(ts.node_psi(&model, NodeId::from_index(1)).z, 0.3);
        assert!(ts.is_finite());
    }

    #[test]
    fn nan_is_located() {
        let mut ts = StructuralTimeStep::initial(&beam());
        ts.pos_dot[1].y = f64::NAN;
        assert_eq!(ts.first_non_finite(), Some("pos_dot"));
    }

    #[test]
    fn integrate_position_uses_inertial_frame() {
        let mut ts = StructuralTimeStep::initial(&beam());
        ts.quat = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        ts.for_vel[0] = 2.0;
        ts.integrate_position(0.5);
        assert!(ts.for_pos[0].abs() < 1e-12);
        assert!((ts.for_pos[1] - 1.0).abs() < 1e-12);
    }
}
