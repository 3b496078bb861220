use fw_core::NodeId;
use fw_structure::{BeamBuilder, BoundaryCode, NodeDof, StructureError};
use nalgebra::Vector3;
use proptest::prelude::*;
use std::f64::consts::FRAC_PI_2;

/// Straight spanwise chain of three-node elements with a clamped root.
fn chain(elements: usize, spacing: f64) -> BeamBuilder {
    let mut b = BeamBuilder::new();
    let num_nodes = 2 * elements + 1;
    let nodes: Vec<NodeId> = (0..num_nodes)
        .map(|i| {
            let code = if i == 0 {
                BoundaryCode::CLAMPED
            } else if i + 1 == num_nodes {
                BoundaryCode::FREE_END
            } else {
                BoundaryCode::FREE
            };
            b.add_node(Vector3::new(0.0, i as f64 * spacing, 0.0), code)
        })
        .collect();
    for e in 0..elements {
        let start = 2 * e;
        b.add_element_3node(
            [nodes[start], nodes[start + 2], nodes[start + 1]],
            Vector3::new(0.0, 0.0, FRAC_PI_2),
        );
    }
    b
}

proptest! {
    #[test]
    fn chain_dofs_exclude_clamped_root(elements in 1usize..12, spacing in 0.05f64..2.0) {
        let beam = chain(elements, spacing).build().unwrap();
        prop_assert_eq!(beam.num_nodes(), 2 * elements + 1);
        prop_assert_eq!(beam.num_dof(), 6 * 2 * elements);
        prop_assert_eq!(beam.node_dof(NodeId::from_index(0)), NodeDof::Clamped);
    }

    #[test]
    fn shared_nodes_belong_to_the_inboard_element(elements in 2usize..10) {
        let beam = chain(elements, 0.5).build().unwrap();
        for e in 1..elements {
            let shared = NodeId::from_usize(2 * e);
            let (master, local) = beam.node_master_elem(shared);
            prop_assert_eq!(master.idx(), e - 1);
            prop_assert_eq!(local, 1);
        }
    }
}

#[test]
fn elements_walk_nodes_in_spanwise_order() {
    let beam = chain(3, 1.0).build().unwrap();
    let order: Vec<usize> = beam
        .elements()
        .iter()
        .flat_map(|e| e.reordered().map(|(_, n)| n.idx()).collect::<Vec<_>>())
        .collect();
    assert_eq!(order, vec![0, 1, 2, 2, 3, 4, 4, 5, 6]);
}

#[test]
fn dangling_reference_is_rejected() {
    let mut b = chain(1, 1.0);
    b.add_element_3node(
        [
            NodeId::from_index(2),
            NodeId::from_index(9),
            NodeId::from_index(1),
        ],
        Vector3::zeros(),
    );
    assert!(matches!(
        b.build(),
        Err(StructureError::InvalidNodeRef { .. })
    ));
}
