//! Immutable beam model.

use fw_core::{ElemId, NodeId};
use nalgebra::Vector3;

use crate::dof::NodeDof;
use crate::element::Element;

/// Static beam description: nodes, elements, boundary conditions and masses.
///
/// Built through [`crate::BeamBuilder`]; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BeamModel {
    pub(crate) pos_ini: Vec<Vector3<f64>>,
    pub(crate) node_dof: Vec<NodeDof>,
    pub(crate) node_mass: Vec<f64>,
    pub(crate) elements: Vec<Element>,
    /// For each node, the first element (canonical order) touching it and the local index.
    pub(crate) node_master_elem: Vec<(ElemId, usize)>,
}

impl BeamModel {
    pub fn num_nodes(&self) -> usize {
        self.pos_ini.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElemId) -> Option<&Element> {
        self.elements.get(id.idx())
    }

    pub fn pos_ini(&self) -> &[Vector3<f64>] {
        &self.pos_ini
    }

    pub fn node_dof(&self, node: NodeId) -> NodeDof {
        self.node_dof[node.idx()]
    }

    pub fn node_dofs(&self) -> &[NodeDof] {
        &self.node_dof
    }

    pub fn node_mass(&self) -> &[f64] {
        &self.node_mass
    }

    pub fn node_master_elem(&self, node: NodeId) -> (ElemId, usize) {
        self.node_master_elem[node.idx()]
    }

    /// Total number of elastic DOFs.
    pub fn num_dof(&self) -> usize {
        self.node_dof.iter().map(|d| d.dofs()).sum()
    }

    /// Elements grouped as a per-element list of initial rotation vectors.
    pub fn psi_ini(&self) -> Vec<Vec<Vector3<f64>>> {
        self.elements.iter().map(|e| e.psi_ini.clone()).collect()
    }
}
