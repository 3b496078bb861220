//! Static aerodynamic description attached to the beam.

use std::str::FromStr;

use fw_core::{SurfId, ensure_positive};
use fw_structure::BeamModel;

use crate::airfoil::Airfoil;
use crate::error::{AeroError, AeroResult};

/// Chordwise panel distribution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordwiseDistribution {
    #[default]
    Uniform,
}

impl FromStr for ChordwiseDistribution {
    type Err = AeroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            other => Err(AeroError::NotSupported {
                what: format!("chordwise panel distribution '{other}'"),
            }),
        }
    }
}

/// Trailing-edge flap spanning the aft `chord_panels` panels of a strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSurface {
    pub chord_panels: usize,
    /// Deflection at step 0, radians.
    pub deflection: f64,
}

/// Per-node aerodynamic attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AeroNodeAttrs {
    pub aero: bool,
    pub chord: f64,
    /// Section twist about the cross-section x axis, radians.
    pub twist: f64,
    /// Elastic axis position as a chord fraction from the leading edge.
    pub elastic_axis: f64,
    pub airfoil: usize,
    pub control_surface: Option<usize>,
}

impl AeroNodeAttrs {
    /// Attributes for a node without a lifting section.
    pub fn none() -> Self {
        Self {
            aero: false,
            chord: 0.0,
            twist: 0.0,
            elastic_axis: 0.0,
            airfoil: 0,
            control_surface: None,
        }
    }

    pub fn section(chord: f64, twist: f64, elastic_axis: f64, airfoil: usize) -> Self {
        Self {
            aero: true,
            chord,
            twist,
            elastic_axis,
            airfoil,
            control_surface: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AeroInput {
    pub nodes: Vec<AeroNodeAttrs>,
    /// Lifting surface of each element, `None` for elements carrying no surface.
    pub surface_distribution: Vec<Option<SurfId>>,
    /// Chordwise panel count per surface.
    pub surface_m: Vec<usize>,
    pub distribution: ChordwiseDistribution,
    pub airfoils: Vec<Airfoil>,
    pub control_surfaces: Vec<ControlSurface>,
}

impl AeroInput {
    pub fn num_surfaces(&self) -> usize {
        self.surface_m.len()
    }

    pub fn validate(&self, beam: &BeamModel) -> AeroResult<()> {
        if self.nodes.len() != beam.num_nodes() {
            return Err(AeroError::SizeMismatch {
                what: "aero node attributes",
                expected: beam.num_nodes(),
                actual: self.nodes.len(),
            });
        }
        if self.surface_distribution.len() != beam.num_elements() {
            return Err(AeroError::SizeMismatch {
                what: "surface distribution",
                expected: beam.num_elements(),
                actual: self.surface_distribution.len(),
            });
        }
        for (i, &m) in self.surface_m.iter().enumerate() {
            if m == 0 {
                return Err(AeroError::config(format!(
                    "surface {i} has zero chordwise panels"
                )));
            }
        }
        for (e, surf) in self.surface_distribution.iter().enumerate() {
            let Some(s) = surf else { continue };
            if s.idx() >= self.surface_m.len() {
                return Err(AeroError::config(format!(
                    "element {e} references surface {s}, only {} defined",
                    self.surface_m.len()
                )));
            }
        }
        for (n, attrs) in self.nodes.iter().enumerate() {
            if !attrs.aero {
                continue;
            }
            ensure_positive(attrs.chord, "chord")?;
            if !attrs.twist.is_finite() {
                return Err(AeroError::config(format!("node {n}: twist is not finite")));
            }
            if !(0.0..=1.0).contains(&attrs.elastic_axis) {
                return Err(AeroError::config(format!(
                    "node {n}: elastic axis {} outside [0, 1]",
                    attrs.elastic_axis
                )));
            }
            if attrs.airfoil >= self.airfoils.len() {
                return Err(AeroError::config(format!(
                    "node {n}: airfoil {} not defined",
                    attrs.airfoil
                )));
            }
            if let Some(cs) = attrs.control_surface {
                if cs >= self.control_surfaces.len() {
                    return Err(AeroError::config(format!(
                        "node {n}: control surface {cs} not defined"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_parsing() {
        assert_eq!(
            "Uniform".parse::<ChordwiseDistribution>().unwrap(),
            ChordwiseDistribution::Uniform
        );
        let err = "cosine".parse::<ChordwiseDistribution>().unwrap_err();
        assert!(matches!(err, AeroError::NotSupported { .. }));
    }
}
