//! fw-aero: lifting-surface geometry and aero/structure transfer for flexwing.
//!
//! Provides:
//! - Airfoil camber lookup and per-node aerodynamic attributes
//! - Structural node to span-station mapping
//! - Grid generation from a deformed beam (twist, flaps, free-stream alignment)
//! - Panel-corner force transfer to structural nodal loads
//! - Aerodynamic time-step snapshots with per-surface force totals

pub mod airfoil;
pub mod error;
pub mod force_map;
pub mod grid;
pub mod input;
pub mod mapping;
pub mod model;
pub mod timestep;

pub use airfoil::Airfoil;
pub use error::{AeroError, AeroResult};
pub use force_map::{ForceChannel, map_forces, resultant};
pub use grid::{Flap, GridSettings, StripSection, generate_strip};
pub use input::{AeroInput, AeroNodeAttrs, ChordwiseDistribution, ControlSurface};
pub use mapping::{AeroLocation, NodeMapping, StripSource};
pub use model::AeroModel;
pub use timestep::{AeroTimeStepInfo, PointGrid, SurfaceState, SurfaceTotals};
