use thiserror::Error;

pub type FwResult<T> = Result<T, FwError>;

/// Scalar input checks shared by the model crates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FwError {
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },

    #[error("{what} must be non-negative, got {value}")]
    Negative { what: &'static str, value: f64 },
}
