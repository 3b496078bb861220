//! fw-structure: beam model layer for flexwing.
//!
//! Provides:
//! - Beam connectivity (elements with natural node ordering)
//! - Incremental beam builder with validation
//! - Shared node DOF classification (clamped / free / driven)
//! - Structural time-step snapshots
//! - Rotation helpers and mode-shape scaling
//!
//! # Example
//!
//! ```
//! use fw_structure::{BeamBuilder, BoundaryCode};
//! use nalgebra::Vector3;
//!
//! let mut builder = BeamBuilder::new();
//! let n0 = builder.add_node(Vector3::new(0.0, 0.0, 0.0), BoundaryCode::CLAMPED);
//! let n1 = builder.add_node(Vector3::new(0.0, 0.5, 0.0), BoundaryCode::FREE);
//! let n2 = builder.add_node(Vector3::new(0.0, 1.0, 0.0), BoundaryCode::FREE_END);
//! builder.add_element_3node([n0, n2, n1], Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
//! let beam = builder.build().unwrap();
//!
//! assert_eq!(beam.num_nodes(), 3);
//! assert_eq!(beam.num_dof(), 12);
//! ```

pub mod builder;
pub mod dof;
pub mod element;
pub mod error;
pub mod modal;
pub mod model;
pub mod rotation;
pub mod timestep;
pub(crate) mod validate;

pub use builder::BeamBuilder;
pub use dof::{BoundaryCode, NodeDof, classify_node};
pub use element::Element;
pub use error::{StructureError, StructureResult};
pub use modal::scale_mode_shape;
pub use model::BeamModel;
pub use timestep::{StructuralTimeStep, Vector6};
