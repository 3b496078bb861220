//! Beam elements.

use fw_core::{ElemId, NodeId};
use nalgebra::Vector3;

/// A beam element: global node connectivity plus its natural ordering.
///
/// Three-node elements are stored as `[end_a, end_b, mid]`, so raw
/// connectivity order is not spanwise order. `ordering` lists local indices
/// in natural (monotone along the element) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElemId,
    pub connectivities: Vec<NodeId>,
    pub ordering: Vec<usize>,
    /// Cartesian rotation vector of the cross-section frame at each local node.
    pub psi_ini: Vec<Vector3<f64>>,
}

impl Element {
    pub fn num_nodes(&self) -> usize {
        self.connectivities.len()
    }

    /// Global nodes in natural order, paired with their local index.
    pub fn reordered(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.ordering
            .iter()
            .map(move |&local| (local, self.connectivities[local]))
    }

    /// Local index of a global node, if the element touches it.
    pub fn local_index(&self, node: NodeId) -> Option<usize> {
        self.connectivities.iter().position(|&n| n == node)
    }
}

/// Natural ordering for the usual connectivity layouts.
pub fn default_ordering(num_nodes: usize) -> Vec<usize> {
    match num_nodes {
        3 => vec![0, 2, 1],
        n => (0..n).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_node_element_reorders_mid_node() {
        let elem = Element {
            id: ElemId::from_index(0),
            connectivities: vec![
                NodeId::from_index(0),
                NodeId::from_index(2),
                NodeId::from_index(1),
            ],
            ordering: default_ordering(3),
            psi_ini: vec![Vector3::zeros(); 3],
        };
        let order: Vec<u32> = elem.reordered().map(|(_, n)| n.index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(elem.local_index(NodeId::from_index(1)), Some(2));
        assert_eq!(elem.local_index(NodeId::from_index(9)), None);
    }

    #[test]
    fn two_node_ordering_is_identity() {
        assert_eq!(default_ordering(2), vec![0, 1]);
    }
}
