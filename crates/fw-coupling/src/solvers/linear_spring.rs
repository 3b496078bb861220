//! Nodal spring structure about the undeformed beam.
//!
//! Each free node carries an independent translational and rotational spring
//! to its initial position and orientation. Clamped and driven nodes do not
//! deform.

use fw_core::ensure_positive;
use fw_core::units::constants::G0_MPS2;
use fw_structure::{BeamModel, NodeDof, StructuralTimeStep};
use nalgebra::Vector3;

use super::StructuralSolver;
use crate::error::{CouplingError, CouplingResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SpringStructureSettings {
    /// N/m
    pub translational_stiffness: f64,
    /// N m/rad
    pub rotational_stiffness: f64,
    pub gravity: bool,
    /// Direction of gravity in the inertial frame.
    pub gravity_dir: Vector3<f64>,
    pub gravity_accel: f64,
}

impl Default for SpringStructureSettings {
    fn default() -> Self {
        Self {
            translational_stiffness: 1.0e4,
            rotational_stiffness: 1.0e3,
            gravity: false,
            gravity_dir: -Vector3::z(),
            gravity_accel: G0_MPS2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinearSpringSolver {
    settings: SpringStructureSettings,
}

impl LinearSpringSolver {
    pub fn new(settings: SpringStructureSettings) -> CouplingResult<Self> {
        let s = &settings;
        ensure_positive(s.translational_stiffness, "translational stiffness")?;
        ensure_positive(s.rotational_stiffness, "rotational stiffness")?;
        if s.gravity && (s.gravity_dir.norm() == 0.0 || !s.gravity_accel.is_finite()) {
            return Err(CouplingError::config(
                "gravity needs a non-zero direction and finite acceleration",
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SpringStructureSettings {
        &self.settings
    }

    /// Body-frame weight per unit mass.
    fn gravity_body(&self, state: &StructuralTimeStep) -> Vector3<f64> {
        if !self.settings.gravity {
            return Vector3::zeros();
        }
        state.cag() * (self.settings.gravity_dir.normalize() * self.settings.gravity_accel)
    }

    fn deform(&self, beam: &BeamModel, state: &mut StructuralTimeStep) {
        let g = self.gravity_body(state);
        let kt = self.settings.translational_stiffness;
        let kr = self.settings.rotational_stiffness;

        let mut rotation = vec![Vector3::zeros(); beam.num_nodes()];
        for (n, dof) in beam.node_dofs().iter().enumerate() {
            let rest = beam.pos_ini()[n];
            if *dof != NodeDof::Free {
                state.pos[n] = rest;
                continue;
            }
            let load = state.total_applied(n);
            let force = load.fixed_rows::<3>(0) + g * beam.node_mass()[n];
            state.pos[n] = rest + force / kt;
            rotation[n] = load.fixed_rows::<3>(3) / kr;
        }
        for (e, elem) in beam.elements().iter().enumerate() {
            for (l, node) in elem.connectivities.iter().enumerate() {
                state.psi[e][l] = elem.psi_ini[l] + rotation[node.idx()];
            }
        }
    }
}

impl StructuralSolver for LinearSpringSolver {
    fn name(&self) -> &'static str {
        "linear spring"
    }

    fn advance(
        &mut self,
        beam: &BeamModel,
        start: &StructuralTimeStep,
        state: &mut StructuralTimeStep,
        dt: f64,
    ) -> CouplingResult<()> {
        self.deform(beam, state);
        for n in 0..state.num_nodes() {
            let vel = (state.pos[n] - start.pos[n]) / dt;
            state.pos_ddot[n] = (vel - start.pos_dot[n]) / dt;
            state.pos_dot[n] = vel;
        }
        for (e, psi) in state.psi.iter().enumerate() {
            for (l, p) in psi.iter().enumerate() {
                state.psi_dot[e][l] = (p - start.psi[e][l]) / dt;
            }
        }
        Ok(())
    }

    fn solve_static(
        &mut self,
        beam: &BeamModel,
        state: &mut StructuralTimeStep,
    ) -> CouplingResult<()> {
        self.deform(beam, state);
        Ok(())
    }

    fn extract_resultants(
        &self,
        beam: &BeamModel,
        state: &StructuralTimeStep,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let g = self.gravity_body(state);
        let mut force = Vector3::zeros();
        let mut moment = Vector3::zeros();
        for n in 0..state.num_nodes() {
            let load = state.total_applied(n);
            let f = load.fixed_rows::<3>(0) + g * beam.node_mass()[n];
            force += f;
            moment += load.fixed_rows::<3>(3) + state.pos[n].cross(&f);
        }
        (force, moment)
    }
}
