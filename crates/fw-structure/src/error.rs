//! Structure-specific error types.

use fw_core::{ElemId, FwError, NodeId};
use thiserror::Error;

/// Beam construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Element {elem} refers to non-existent node {node}")]
    InvalidNodeRef { elem: ElemId, node: NodeId },

    #[error("Element {elem} has an invalid local ordering {ordering:?}")]
    InvalidOrdering { elem: ElemId, ordering: Vec<usize> },

    #[error("Node {node} is not connected to any element")]
    OrphanNode { node: NodeId },

    #[error("Unknown boundary condition code {code} at node {node}")]
    UnknownBoundaryCode { node: NodeId, code: i8 },

    #[error("Non-finite value in {what}")]
    NonFinite { what: String },

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type StructureResult<T> = Result<T, StructureError>;

impl From<FwError> for StructureError {
    fn from(err: FwError) -> Self {
        StructureError::Configuration {
            what: err.to_string(),
        }
    }
}
