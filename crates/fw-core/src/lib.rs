//! fw-core: stable foundation for flexwing.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + finiteness and sign checks)
//! - ids (compact IDs for beam nodes, elements and aero surfaces)
//! - error (shared error types)
//! - timing (coupling phase timers)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{FwError, FwResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
