//! fw-coupling: fluid-structure interaction driver for flexwing.
//!
//! Provides:
//! - Structural and aerodynamic solver interfaces with closed solver-kind enums
//! - Reference solvers (nodal springs, quasi-steady flat panels)
//! - Coupling settings and the load relaxation schedule
//! - Bounded snapshot history with explicit commit
//! - The substep state machine for dynamic and static coupling
//! - Prescribed forcing lookup and per-step post-processors

pub mod driver;
pub mod error;
pub mod forcing;
pub mod history;
pub mod postproc;
pub mod relaxation;
pub mod settings;
pub mod solvers;

pub use driver::{
    CouplingDriver, CouplingState, RunSummary, StepOutcome, StepReport, relative_change,
};
pub use error::{CouplingError, CouplingResult};
pub use forcing::{PrescribedForcing, PrescribedStep};
pub use history::{CouplingSnapshot, SnapshotHistory};
pub use postproc::{
    AeroForcesCalculator, AeroForcesSettings, ForceRecord, PostProcessor, PostProcessorKind,
};
pub use relaxation::{relax_loads, relaxation_factor};
pub use settings::{CouplingSettings, ExhaustionPolicy};
pub use solvers::{
    AeroSolver, AeroSolverKind, FlatPanelSettings, FlatPanelSolver, LinearSpringSolver,
    SpringStructureSettings, StructuralSolver, StructuralSolverKind,
};

/// Driver wired to the built-in solver kinds.
pub type StandardDriver = CouplingDriver<StructuralSolverKind, AeroSolverKind>;
