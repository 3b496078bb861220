//! Error types for aerodynamic grid, mapping and force operations.

use fw_core::FwError;
use fw_structure::StructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeroError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Not supported: {what}")]
    NotSupported { what: String },

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] FwError),
}

pub type AeroResult<T> = Result<T, AeroError>;

impl AeroError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        AeroError::Configuration { what: what.into() }
    }
}
