//! Error types for the fw-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write case file: {path}")]
    CaseFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Case validation failed: {0}")]
    Validation(String),

    #[error("Runtime compilation failed: {0}")]
    Compile(String),

    #[error("Coupling error: {0}")]
    Coupling(String),

    #[error("Trim error: {0}")]
    Trim(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fw-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<fw_project::ProjectError> for AppError {
    fn from(err: fw_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<fw_project::ValidationError> for AppError {
    fn from(err: fw_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<fw_structure::StructureError> for AppError {
    fn from(err: fw_structure::StructureError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<fw_aero::AeroError> for AppError {
    fn from(err: fw_aero::AeroError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<fw_coupling::CouplingError> for AppError {
    fn from(err: fw_coupling::CouplingError) -> Self {
        AppError::Coupling(err.to_string())
    }
}

impl From<fw_trim::TrimError> for AppError {
    fn from(err: fw_trim::TrimError) -> Self {
        AppError::Trim(err.to_string())
    }
}
