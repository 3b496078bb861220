//! Structural node to aerodynamic span-station mapping.
//!
//! Elements are walked in canonical order and their nodes in natural order,
//! so span indices on every surface increase monotonically along the beam.
//! A node shared by two surfaces (a wing root) maps to one span station on
//! each of them.

use fw_core::{ElemId, NodeId, SurfId};
use fw_structure::BeamModel;
use tracing::debug;

use crate::error::{AeroError, AeroResult};
use crate::input::AeroInput;

/// One span station on one lifting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AeroLocation {
    pub surface: SurfId,
    pub span: usize,
}

/// Structural origin of a span station: the node plus the element it was
/// discovered through, which supplies the section orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSource {
    pub node: NodeId,
    pub elem: ElemId,
    pub local: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMapping {
    struct2aero: Vec<Vec<AeroLocation>>,
    strips: Vec<Vec<StripSource>>,
}

impl NodeMapping {
    pub fn build(beam: &BeamModel, input: &AeroInput) -> AeroResult<Self> {
        input.validate(beam)?;

        let n_surf = input.num_surfaces();
        let mut struct2aero: Vec<Vec<AeroLocation>> = vec![Vec::new(); beam.num_nodes()];
        let mut strips: Vec<Vec<StripSource>> = vec![Vec::new(); n_surf];

        for elem in beam.elements() {
            let Some(surface) = input.surface_distribution[elem.id.idx()] else {
                continue;
            };
            for (local, node) in elem.reordered() {
                if !input.nodes[node.idx()].aero {
                    continue;
                }
                let locs = &mut struct2aero[node.idx()];
                if locs.iter().any(|l| l.surface == surface) {
                    continue;
                }
                let span = strips[surface.idx()].len();
                locs.push(AeroLocation { surface, span });
                strips[surface.idx()].push(StripSource {
                    node,
                    elem: elem.id,
                    local,
                });
            }
        }

        for (n, attrs) in input.nodes.iter().enumerate() {
            if attrs.aero && struct2aero[n].is_empty() {
                return Err(AeroError::config(format!(
                    "node {n} is flagged aerodynamic but belongs to no surface-bearing element"
                )));
            }
        }
        for (s, stations) in strips.iter().enumerate() {
            if stations.len() < 2 {
                return Err(AeroError::config(format!(
                    "surface {s} has {} span stations, needs at least 2",
                    stations.len()
                )));
            }
        }

        debug!(
            surfaces = n_surf,
            stations = strips.iter().map(Vec::len).sum::<usize>(),
            "node mapping built"
        );
        Ok(Self {
            struct2aero,
            strips,
        })
    }

    pub fn num_surfaces(&self) -> usize {
        self.strips.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.struct2aero.len()
    }

    /// Number of span stations (`N + 1`) on a surface.
    pub fn span_stations(&self, surface: SurfId) -> usize {
        self.strips[surface.idx()].len()
    }

    /// Every span station a structural node drives; empty for non-aero nodes.
    pub fn locations(&self, node: NodeId) -> &[AeroLocation] {
        &self.struct2aero[node.idx()]
    }

    pub fn strips(&self, surface: SurfId) -> &[StripSource] {
        &self.strips[surface.idx()]
    }

    pub fn strip(&self, loc: AeroLocation) -> StripSource {
        self.strips[loc.surface.idx()][loc.span]
    }

    pub fn node_at(&self, loc: AeroLocation) -> NodeId {
        self.strip(loc).node
    }
}
