//! Incremental beam builder.

use fw_core::{ElemId, NodeId};
use nalgebra::Vector3;

use crate::dof::{BoundaryCode, classify_node};
use crate::element::{Element, default_ordering};
use crate::error::StructureResult;
use crate::model::BeamModel;
use crate::validate;

/// Builder for constructing a beam incrementally.
///
/// Use `add_node` and `add_element` to build up the beam,
/// then call `build()` to validate and freeze it into an immutable `BeamModel`.
#[derive(Debug, Default)]
pub struct BeamBuilder {
    pos: Vec<Vector3<f64>>,
    codes: Vec<BoundaryCode>,
    mass: Vec<f64>,
    elements: Vec<Element>,
}

impl BeamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at its undeformed position (body frame) and return its ID.
    pub fn add_node(&mut self, pos: Vector3<f64>, code: BoundaryCode) -> NodeId {
        let id = NodeId::from_usize(self.pos.len());
        self.pos.push(pos);
        self.codes.push(code);
        self.mass.push(0.0);
        id
    }

    /// Attach a lumped mass to a node. Unknown nodes are ignored.
    pub fn set_node_mass(&mut self, node: NodeId, mass: f64) {
        if let Some(m) = self.mass.get_mut(node.idx()) {
            *m = mass;
        }
    }

    /// Add an element with explicit natural ordering and per-node rotation vectors.
    pub fn add_element(
        &mut self,
        connectivities: Vec<NodeId>,
        ordering: Vec<usize>,
        psi_ini: Vec<Vector3<f64>>,
    ) -> ElemId {
        let id = ElemId::from_usize(self.elements.len());
        self.elements.push(Element {
            id,
            connectivities,
            ordering,
            psi_ini,
        });
        id
    }

    /// Add a three-node element `[end_a, end_b, mid]` sharing one rotation vector.
    pub fn add_element_3node(&mut self, nodes: [NodeId; 3], psi: Vector3<f64>) -> ElemId {
        self.add_element(nodes.to_vec(), default_ordering(3), vec![psi; 3])
    }

    /// Build and validate the beam, returning an immutable `BeamModel`.
    pub fn build(self) -> StructureResult<BeamModel> {
        validate::validate_nodes(&self.pos, &self.mass)?;
        validate::validate_elements(self.pos.len(), &self.elements)?;
        validate::validate_coverage(self.pos.len(), &self.elements)?;

        let node_dof = self
            .codes
            .iter()
            .enumerate()
            .map(|(i, &code)| classify_node(NodeId::from_usize(i), code))
            .collect::<StructureResult<Vec<_>>>()?;

        let node_master_elem = Self::master_elements(self.pos.len(), &self.elements);

        Ok(BeamModel {
            pos_ini: self.pos,
            node_dof,
            node_mass: self.mass,
            elements: self.elements,
            node_master_elem,
        })
    }

    /// First element (canonical order) touching each node, with the local index.
    fn master_elements(num_nodes: usize, elements: &[Element]) -> Vec<(ElemId, usize)> {
        let mut master: Vec<Option<(ElemId, usize)>> = vec![None; num_nodes];
        for elem in elements {
            for (local, &node) in elem.connectivities.iter().enumerate() {
                master[node.idx()].get_or_insert((elem.id, local));
            }
        }
        // coverage was validated, every slot is populated
        master
            .into_iter()
            .map(|m| m.unwrap_or((ElemId::from_index(0), 0)))
            .collect()
    }
}
