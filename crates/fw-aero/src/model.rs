//! Validated aerodynamic model bound to one beam.

use fw_core::SurfId;
use fw_structure::BeamModel;
use tracing::info;

use crate::error::{AeroError, AeroResult};
use crate::grid::GridSettings;
use crate::input::AeroInput;
use crate::mapping::NodeMapping;

/// Aerodynamic input, node mapping and grid settings, fixed for a whole run.
#[derive(Debug, Clone)]
pub struct AeroModel {
    input: AeroInput,
    mapping: NodeMapping,
    settings: GridSettings,
}

impl AeroModel {
    pub fn new(beam: &BeamModel, input: AeroInput, settings: GridSettings) -> AeroResult<Self> {
        if !settings.freestream_dir.iter().all(|x| x.is_finite())
            || settings.freestream_dir.norm() == 0.0
        {
            return Err(AeroError::Configuration {
                what: "free-stream direction must be a finite non-zero vector".to_string(),
            });
        }
        let mapping = NodeMapping::build(beam, &input)?;

        for (s, &m) in input.surface_m.iter().enumerate() {
            let surf = SurfId::from_usize(s);
            for src in mapping.strips(surf) {
                let Some(cs) = input.nodes[src.node.idx()].control_surface else {
                    continue;
                };
                let panels = input.control_surfaces[cs].chord_panels;
                if panels > m {
                    return Err(AeroError::Configuration {
                        what: format!(
                            "control surface {cs} spans {panels} chordwise panels, surface {s} has {m}"
                        ),
                    });
                }
            }
        }

        info!(
            surfaces = mapping.num_surfaces(),
            aligned = settings.aligned_grid,
            mstar = settings.mstar,
            "aero model ready"
        );
        Ok(Self {
            input,
            mapping,
            settings,
        })
    }

    pub fn input(&self) -> &AeroInput {
        &self.input
    }

    pub fn mapping(&self) -> &NodeMapping {
        &self.mapping
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// `(M, N)` panel counts per surface.
    pub fn dimensions(&self) -> Vec<(usize, usize)> {
        self.input
            .surface_m
            .iter()
            .enumerate()
            .map(|(s, &m)| (m, self.mapping.span_stations(SurfId::from_usize(s)) - 1))
            .collect()
    }

    pub fn num_control_surfaces(&self) -> usize {
        self.input.control_surfaces.len()
    }
}
