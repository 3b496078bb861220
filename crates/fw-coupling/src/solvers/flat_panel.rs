//! Quasi-steady flat-panel aerodynamics.
//!
//! Every bound panel produces a normal force `q A 2 pi sin(a)`, where `a` is
//! the incidence of the relative wind on the panel. The force is lumped in
//! equal quarters onto the panel corners. Only the steady channel is filled.

use std::f64::consts::PI;

use fw_aero::{AeroTimeStepInfo, SurfaceState};
use fw_core::{ensure_non_negative, ensure_positive};
use fw_structure::StructuralTimeStep;
use nalgebra::Vector3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::AeroSolver;
use crate::error::{CouplingError, CouplingResult};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatPanelSettings {
    /// kg/m^3
    pub rho: f64,
    /// m/s
    pub u_inf: f64,
    /// Free-stream direction in the inertial frame.
    pub u_inf_direction: Vector3<f64>,
}

impl Default for FlatPanelSettings {
    fn default() -> Self {
        Self {
            rho: 1.225,
            u_inf: 10.0,
            u_inf_direction: Vector3::x(),
        }
    }
}

#[derive(Debug)]
pub struct FlatPanelSolver {
    settings: FlatPanelSettings,
    pool: ThreadPool,
}

impl FlatPanelSolver {
    pub fn new(settings: FlatPanelSettings, num_cores: usize) -> CouplingResult<Self> {
        ensure_positive(settings.rho, "air density")?;
        ensure_non_negative(settings.u_inf, "free-stream speed")?;
        if settings.u_inf_direction.norm() == 0.0 {
            return Err(CouplingError::config("free-stream direction must be non-zero"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_cores.max(1))
            .build()
            .map_err(|e| CouplingError::config(format!("aero worker pool: {e}")))?;
        Ok(Self { settings, pool })
    }

    pub fn settings(&self) -> &FlatPanelSettings {
        &self.settings
    }

    /// Relative free-stream velocity seen by the body, body frame.
    fn relative_wind(&self, structure: &StructuralTimeStep) -> Vector3<f64> {
        let u_g = self.settings.u_inf_direction.normalize() * self.settings.u_inf;
        structure.cag() * u_g - structure.for_vel.fixed_rows::<3>(0)
    }
}

fn panel_forces(surface: &mut SurfaceState, wind: &Vector3<f64>, rho: f64) {
    surface.forces.fill_zero();
    surface.dynamic_forces.fill_zero();
    for i in 0..surface.m {
        for j in 0..surface.n {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            let u_ext: Vector3<f64> = corners
                .iter()
                .map(|&(a, b)| surface.u_ext.get(a, b))
                .sum::<Vector3<f64>>()
                * 0.25;
            let w = wind + u_ext;
            let speed = w.norm();
            let normal = surface.panel_normal_area2(i, j);
            let area2 = normal.norm();
            if speed == 0.0 || area2 == 0.0 {
                surface.gamma[(i, j)] = 0.0;
                continue;
            }
            let n_hat = normal / area2;
            let area = 0.5 * area2;
            let cn = 2.0 * PI * w.dot(&n_hat) / speed;
            let force = n_hat * (0.5 * rho * speed * speed * area * cn);
            for &(a, b) in &corners {
                *surface.forces.get_mut(a, b) += force * 0.25;
            }
            let span = 0.5
                * ((surface.zeta.get(i, j + 1) - surface.zeta.get(i, j)).norm()
                    + (surface.zeta.get(i + 1, j + 1) - surface.zeta.get(i + 1, j)).norm());
            surface.gamma[(i, j)] = if span > 0.0 {
                0.5 * speed * area * cn / span
            } else {
                0.0
            };
        }
    }
}

/// Shift the wake one row downstream and shed the trailing-edge circulation.
fn convect_wake(surface: &mut SurfaceState, wind: &Vector3<f64>, dt: f64) {
    let mstar = surface.mstar();
    let (m, n) = (surface.m, surface.n);
    for i in (1..=mstar).rev() {
        for j in 0..=n {
            let p = surface.zeta_star.get(i - 1, j) + wind * dt;
            surface.zeta_star.set(i, j, p);
        }
    }
    for j in 0..=n {
        surface.zeta_star.set(0, j, surface.zeta.get(m, j));
    }
    if mstar > 0 {
        for i in (1..mstar).rev() {
            for j in 0..n {
                surface.gamma_star[(i, j)] = surface.gamma_star[(i - 1, j)];
            }
        }
        for j in 0..n {
            surface.gamma_star[(0, j)] = surface.gamma[(m - 1, j)];
        }
    }
}

impl AeroSolver for FlatPanelSolver {
    fn name(&self) -> &'static str {
        "flat panel"
    }

    fn solve(
        &mut self,
        structure: &StructuralTimeStep,
        aero: &mut AeroTimeStepInfo,
        convect: bool,
        dt: f64,
    ) -> CouplingResult<()> {
        let wind = self.relative_wind(structure);
        let rho = self.settings.rho;
        self.pool.install(|| {
            aero.surfaces
                .par_iter_mut()
                .for_each(|s| panel_forces(s, &wind, rho));
        });
        if convect {
            for s in &mut aero.surfaces {
                convect_wake(s, &wind, dt);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_structure::rotation::euler2quat;
    use fw_structure::{BeamBuilder, BoundaryCode};

    fn flat_square() -> SurfaceState {
        let mut s = SurfaceState::new(1, 1, 2);
        s.zeta.set(0, 0, Vector3::new(0.0, 0.0, 0.0));
        s.zeta.set(1, 0, Vector3::new(1.0, 0.0, 0.0));
        s.zeta.set(1, 1, Vector3::new(1.0, 1.0, 0.0));
        s.zeta.set(0, 1, Vector3::new(0.0, 1.0, 0.0));
        s
    }

    fn structure() -> StructuralTimeStep {
        let mut b = BeamBuilder::new();
        let n0 = b.add_node(Vector3::zeros(), BoundaryCode::CLAMPED);
        let n1 = b.add_node(Vector3::y(), BoundaryCode::FREE_END);
        b.add_element(vec![n0, n1], vec![0, 1], vec![Vector3::zeros(); 2]);
        StructuralTimeStep::initial(&b.build().unwrap())
    }

    #[test]
    fn zero_incidence_gives_zero_force() {
        let mut aero = AeroTimeStepInfo {
            surfaces: vec![flat_square()],
            control_surface_deflection: Vec::new(),
            totals: Vec::new(),
        };
        let mut solver = FlatPanelSolver::new(FlatPanelSettings::default(), 1).unwrap();
        solver.solve(&structure(), &mut aero, false, 0.1).unwrap();
        assert!(aero.surfaces[0].forces.sum().norm() < 1e-12);
    }

    #[test]
    fn pitched_body_lifts_regardless_of_normal_orientation() {
        let alpha = 0.05_f64;
        let mut st = structure();
        st.quat = euler2quat(0.0, alpha, 0.0);
        let mut solver = FlatPanelSolver::new(FlatPanelSettings::default(), 2).unwrap();

        let mut flipped = flat_square();
        flipped.zeta.set(0, 1, Vector3::new(0.0, 0.0, 0.0));
        flipped.zeta.set(1, 1, Vector3::new(1.0, 0.0, 0.0));
        flipped.zeta.set(1, 0, Vector3::new(1.0, 1.0, 0.0));
        flipped.zeta.set(0, 0, Vector3::new(0.0, 1.0, 0.0));

        let mut aero = AeroTimeStepInfo {
            surfaces: vec![flat_square(), flipped],
            control_surface_deflection: Vec::new(),
            totals: vec![Default::default(); 2],
        };
        solver.solve(&st, &mut aero, false, 0.1).unwrap();
        let lift = 0.5 * 1.225 * 100.0 * 2.0 * PI * alpha.sin();
        for s in &aero.surfaces {
            let f = s.forces.sum();
            assert!((f.z - lift).abs() < 1e-9);
            assert!(f.x.abs() < 1e-12 && f.y.abs() < 1e-12);
        }
    }

    #[test]
    fn wake_convects_only_on_request() {
        let mut aero = AeroTimeStepInfo {
            surfaces: vec![flat_square()],
            control_surface_deflection: Vec::new(),
            totals: Vec::new(),
        };
        let mut solver = FlatPanelSolver::new(FlatPanelSettings::default(), 1).unwrap();
        let st = structure();
        solver.solve(&st, &mut aero, false, 0.1).unwrap();
        assert_eq!(aero.surfaces[0].zeta_star.get(2, 0), Vector3::zeros());
        solver.solve(&st, &mut aero, true, 0.1).unwrap();
        let s = &aero.surfaces[0];
        assert_eq!(s.zeta_star.get(0, 0), s.zeta.get(1, 0));
        assert!((s.zeta_star.get(1, 0) - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }
}
