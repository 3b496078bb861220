//! Static trim search for the coupled aeroelastic system.
//!
//! A trim state is the body orientation plus control-surface deflections
//! and thrust settings. [`trim`] searches it so that the static coupled
//! solution carries no net force or moment.

pub mod error;
pub mod optimize;
pub mod problem;
pub mod settings;
pub mod solve;
pub mod state;

pub use error::{TrimError, TrimResult};
pub use optimize::{
    BfgsConfig, NelderMeadConfig, OptimResult, bfgs, finite_difference_gradient, nelder_mead,
};
pub use problem::{RESULTANT_WEIGHTS, TrimProblem, TrimValue, weighted_objective};
pub use settings::{SpecialCase, TrimOutput, TrimSettings};
pub use solve::{TrimSolution, trim};
pub use state::{TrimIndexMap, TrimStateVector};
