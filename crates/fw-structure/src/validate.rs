//! Beam validation.

use std::collections::HashSet;

use fw_core::{NodeId, ensure_non_negative};
use nalgebra::Vector3;

use crate::element::Element;
use crate::error::{StructureError, StructureResult};

/// Check node references, local orderings and rotation vectors of every element.
pub(crate) fn validate_elements(num_nodes: usize, elements: &[Element]) -> StructureResult<()> {
    for elem in elements {
        if elem.connectivities.len() < 2 {
            return Err(StructureError::Configuration {
                what: format!(
                    "element {} has {} nodes (expected at least 2)",
                    elem.id,
                    elem.connectivities.len()
                ),
            });
        }

        for &node in &elem.connectivities {
            if node.idx() >= num_nodes {
                return Err(StructureError::InvalidNodeRef {
                    elem: elem.id,
                    node,
                });
            }
        }

        let unique: HashSet<usize> = elem.ordering.iter().copied().collect();
        let is_permutation = elem.ordering.len() == elem.connectivities.len()
            && unique.len() == elem.ordering.len()
            && elem.ordering.iter().all(|&i| i < elem.connectivities.len());
        if !is_permutation {
            return Err(StructureError::InvalidOrdering {
                elem: elem.id,
                ordering: elem.ordering.clone(),
            });
        }

        if elem.psi_ini.len() != elem.connectivities.len() {
            return Err(StructureError::SizeMismatch {
                what: "element rotation vectors",
                expected: elem.connectivities.len(),
                actual: elem.psi_ini.len(),
            });
        }
        if elem.psi_ini.iter().any(|p| !all_finite(p)) {
            return Err(StructureError::NonFinite {
                what: format!("rotation vectors of element {}", elem.id),
            });
        }
    }
    Ok(())
}

/// Every node must belong to at least one element.
pub(crate) fn validate_coverage(num_nodes: usize, elements: &[Element]) -> StructureResult<()> {
    let mut covered = vec![false; num_nodes];
    for elem in elements {
        for &node in &elem.connectivities {
            covered[node.idx()] = true;
        }
    }
    match covered.iter().position(|c| !c) {
        Some(i) => Err(StructureError::OrphanNode {
            node: NodeId::from_usize(i),
        }),
        None => Ok(()),
    }
}

pub(crate) fn validate_nodes(pos: &[Vector3<f64>], mass: &[f64]) -> StructureResult<()> {
    if pos.is_empty() {
        return Err(StructureError::Configuration {
            what: "beam has no nodes".to_string(),
        });
    }
    if let Some(i) = pos.iter().position(|p| !all_finite(p)) {
        return Err(StructureError::NonFinite {
            what: format!("position of node {i}"),
        });
    }
    for &m in mass {
        ensure_non_negative(m, "node mass")?;
    }
    Ok(())
}

fn all_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}
