//! Node degree-of-freedom classification.
//!
//! Every consumer that needs to know whether a node carries elastic DOFs
//! (structural solvers, mode-shape scaling, trim) goes through
//! [`classify_node`] instead of branching on raw boundary codes.

use crate::error::{StructureError, StructureResult};
use fw_core::NodeId;

/// Raw boundary-condition code as found in case input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryCode(pub i8);

impl BoundaryCode {
    pub const FREE_END: BoundaryCode = BoundaryCode(-1);
    pub const FREE: BoundaryCode = BoundaryCode(0);
    pub const CLAMPED: BoundaryCode = BoundaryCode(1);
    pub const DRIVEN: BoundaryCode = BoundaryCode(2);
}

/// Kinematic role of a beam node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeDof {
    /// Fixed to the reference frame, no elastic DOFs.
    Clamped,
    /// Six elastic DOFs.
    Free,
    /// Moves with the prescribed reference-frame motion, no elastic DOFs.
    Driven,
}

impl NodeDof {
    /// Number of elastic degrees of freedom contributed by the node.
    pub fn dofs(self) -> usize {
        match self {
            NodeDof::Free => 6,
            NodeDof::Clamped | NodeDof::Driven => 0,
        }
    }

    pub fn is_deformable(self) -> bool {
        self.dofs() > 0
    }
}

/// Map a boundary code onto the shared DOF classification.
pub fn classify_node(node: NodeId, code: BoundaryCode) -> StructureResult<NodeDof> {
    match code {
        BoundaryCode::CLAMPED => Ok(NodeDof::Clamped),
        BoundaryCode::FREE | BoundaryCode::FREE_END => Ok(NodeDof::Free),
        BoundaryCode::DRIVEN => Ok(NodeDof::Driven),
        BoundaryCode(code) => Err(StructureError::UnknownBoundaryCode { node, code }),
    }
}

/// Offsets of each node's first elastic DOF in a global DOF vector.
///
/// Nodes without elastic DOFs map to `None`.
pub fn dof_offsets(classes: &[NodeDof]) -> (Vec<Option<usize>>, usize) {
    let mut offsets = Vec::with_capacity(classes.len());
    let mut next = 0;
    for class in classes {
        if class.is_deformable() {
            offsets.push(Some(next));
            next += class.dofs();
        } else {
            offsets.push(None);
        }
    }
    (offsets, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_classify() {
        let n = NodeId::from_index(0);
        assert_eq!(classify_node(n, BoundaryCode::CLAMPED).unwrap(), NodeDof::Clamped);
        assert_eq!(classify_node(n, BoundaryCode::FREE).unwrap(), NodeDof::Free);
        assert_eq!(classify_node(n, BoundaryCode::FREE_END).unwrap(), NodeDof::Free);
        assert_eq!(classify_node(n, BoundaryCode::DRIVEN).unwrap(), NodeDof::Driven);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = classify_node(NodeId::from_index(3), BoundaryCode(7)).unwrap_err();
        assert_eq!(
            err,
            StructureError::UnknownBoundaryCode {
                node: NodeId::from_index(3),
                code: 7
            }
        );
    }

    #[test]
    fn offsets_skip_non_deformable_nodes() {
        let classes = [NodeDof::Clamped, NodeDof::Free, NodeDof::Driven, NodeDof::Free];
        let (offsets, total) = dof_offsets(&classes);
        assert_eq!(offsets, vec![None, Some(0), None, Some(6)]);
        assert_eq!(total, 12);
    }
}
