//! Application service layer for flexwing.
//!
//! Loads and validates case files, compiles them into a coupling driver and
//! runs static, dynamic or trim analyses for the CLI.

pub mod case_service;
pub mod error;
pub mod progress;
pub mod run_service;
pub mod runtime_compile;

pub use case_service::{CaseSummary, load_case, save_case, summarize, validate_case};
pub use error::{AppError, AppResult};
pub use progress::{DynamicProgress, RunProgressEvent, RunStage};
pub use run_service::{
    RunMode, RunOutcome, RunRequest, RunResponse, RunTimingSummary, execute_case, run_case,
    run_case_with_progress,
};
pub use runtime_compile::{compile_case, trim_settings};
