//! Error types for the FSI coupling driver.

use fw_aero::AeroError;
use fw_core::FwError;
use fw_structure::StructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CouplingError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Numerical divergence at step {step}, substep {substep}: non-finite {what}")]
    NumericalDivergence {
        step: usize,
        substep: usize,
        what: &'static str,
    },

    #[error("Coupling did not converge at step {step} after {substeps} substeps (residual {residual:e})")]
    ConvergenceFailure {
        step: usize,
        substeps: usize,
        residual: f64,
    },

    #[error("Invalid driver state: {what}")]
    InvalidState { what: &'static str },

    #[error("{solver} solver failed: {message}")]
    Solver {
        solver: &'static str,
        message: String,
    },

    #[error("Post-processor {name} failed: {message}")]
    PostProcessor { name: &'static str, message: String },

    #[error("Aero error: {0}")]
    Aero(#[from] AeroError),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),
}

pub type CouplingResult<T> = Result<T, CouplingError>;

impl CouplingError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        CouplingError::Configuration { what: what.into() }
    }

    /// True for failures a trim search may score instead of aborting on.
    pub fn is_divergence(&self) -> bool {
        matches!(self, CouplingError::NumericalDivergence { .. })
    }
}

impl From<FwError> for CouplingError {
    fn from(err: FwError) -> Self {
        CouplingError::Configuration {
            what: err.to_string(),
        }
    }
}
