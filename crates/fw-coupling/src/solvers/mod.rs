//! Solver capability interfaces and the closed set of built-in solvers.

pub mod flat_panel;
pub mod linear_spring;

use fw_aero::AeroTimeStepInfo;
use fw_structure::{BeamModel, StructuralTimeStep};
use nalgebra::Vector3;

use crate::error::CouplingResult;

pub use flat_panel::{FlatPanelSettings, FlatPanelSolver};
pub use linear_spring::{LinearSpringSolver, SpringStructureSettings};

/// Structural solver as seen by the coupling driver.
///
/// Implementations read the applied loads already stored on `state` and
/// must accept repeated calls with different loads from the same start.
/// Non-finite results are returned, not hidden; the driver checks them.
pub trait StructuralSolver {
    fn name(&self) -> &'static str;

    /// Advance `state` one time step of length `dt` from `start`.
    fn advance(
        &mut self,
        beam: &BeamModel,
        start: &StructuralTimeStep,
        state: &mut StructuralTimeStep,
        dt: f64,
    ) -> CouplingResult<()>;

    /// Static equilibrium under the loads on `state`.
    fn solve_static(&mut self, beam: &BeamModel, state: &mut StructuralTimeStep)
    -> CouplingResult<()>;

    /// Net external force and moment about the body-frame origin.
    fn extract_resultants(
        &self,
        beam: &BeamModel,
        state: &StructuralTimeStep,
    ) -> (Vector3<f64>, Vector3<f64>);
}

/// Aerodynamic solver as seen by the coupling driver.
pub trait AeroSolver {
    fn name(&self) -> &'static str;

    /// Fill panel forces (and circulation) of `aero` for its current grid.
    ///
    /// The wake is convected only when `convect_wake` is set.
    fn solve(
        &mut self,
        structure: &StructuralTimeStep,
        aero: &mut AeroTimeStepInfo,
        convect_wake: bool,
        dt: f64,
    ) -> CouplingResult<()>;
}

#[derive(Debug)]
pub enum StructuralSolverKind {
    LinearSpring(LinearSpringSolver),
}

impl StructuralSolver for StructuralSolverKind {
    fn name(&self) -> &'static str {
        match self {
            StructuralSolverKind::LinearSpring(s) => s.name(),
        }
    }

    fn advance(
        &mut self,
        beam: &BeamModel,
        start: &StructuralTimeStep,
        state: &mut StructuralTimeStep,
        dt: f64,
    ) -> CouplingResult<()> {
        match self {
            StructuralSolverKind::LinearSpring(s) => s.advance(beam, start, state, dt),
        }
    }

    fn solve_static(
        &mut self,
        beam: &BeamModel,
        state: &mut StructuralTimeStep,
    ) -> CouplingResult<()> {
        match self {
            StructuralSolverKind::LinearSpring(s) => s.solve_static(beam, state),
        }
    }

    fn extract_resultants(
        &self,
        beam: &BeamModel,
        state: &StructuralTimeStep,
    ) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            StructuralSolverKind::LinearSpring(s) => s.extract_resultants(beam, state),
        }
    }
}

#[derive(Debug)]
pub enum AeroSolverKind {
    FlatPanel(FlatPanelSolver),
}

impl AeroSolver for AeroSolverKind {
    fn name(&self) -> &'static str {
        match self {
            AeroSolverKind::FlatPanel(s) => s.name(),
        }
    }

    fn solve(
        &mut self,
        structure: &StructuralTimeStep,
        aero: &mut AeroTimeStepInfo,
        convect_wake: bool,
        dt: f64,
    ) -> CouplingResult<()> {
        match self {
            AeroSolverKind::FlatPanel(s) => s.solve(structure, aero, convect_wake, dt),
        }
    }
}
