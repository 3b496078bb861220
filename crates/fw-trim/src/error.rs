//! Error types for trim searches.

use fw_coupling::CouplingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrimError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Optimizer failed: {what}")]
    Optimizer { what: String },

    #[error("Coupling error: {0}")]
    Coupling(#[from] CouplingError),
}

pub type TrimResult<T> = Result<T, TrimError>;
