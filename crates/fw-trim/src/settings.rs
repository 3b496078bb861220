//! Trim settings.

use nalgebra::Vector3;

use crate::error::{TrimError, TrimResult};

/// Thrust allocation policies beyond one magnitude per thrust node.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCase {
    /// Two thrust groups driven from a shared base value and a differential
    /// fraction `d`: positive nodes get `base (1 + d)`, negative nodes
    /// `-base (1 - d)`, base nodes `base`.
    DifferentialThrust {
        initial_base_thrust: f64,
        initial_differential_parameter: f64,
        base_thrust_nodes: Vec<usize>,
        positive_thrust_nodes: Vec<usize>,
        negative_thrust_nodes: Vec<usize>,
    },
}

/// What a residual evaluation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimOutput {
    /// Squared resultants weighted 1 for forces and 2 for moments.
    #[default]
    Weighted,
    /// Raw force and moment 6-vector.
    Resultants,
    /// A single resultant component, 0..6.
    Component(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimSettings {
    /// Radians.
    pub initial_alpha: f64,
    pub initial_beta: f64,
    pub initial_roll: f64,
    /// Control surfaces driven by the search.
    pub cs_indices: Vec<usize>,
    pub initial_cs_deflection: Vec<f64>,
    pub thrust_nodes: Vec<usize>,
    pub initial_thrust: Vec<f64>,
    /// Body-frame direction of every thrust force.
    pub thrust_direction: Vector3<f64>,
    pub special_case: Option<SpecialCase>,
    pub tolerance: f64,
    pub max_evaluations: usize,
    pub refine_solution: bool,
    pub output: TrimOutput,
    /// Objective reported for a diverged evaluation; `None` aborts the search.
    pub divergence_penalty: Option<f64>,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            initial_alpha: 0.0,
            initial_beta: 0.0,
            initial_roll: 0.0,
            cs_indices: Vec::new(),
            initial_cs_deflection: Vec::new(),
            thrust_nodes: Vec::new(),
            initial_thrust: Vec::new(),
            thrust_direction: Vector3::new(0.0, 1.0, 0.0),
            special_case: None,
            tolerance: 1e-4,
            max_evaluations: 1000,
            refine_solution: false,
            output: TrimOutput::Weighted,
            divergence_penalty: None,
        }
    }
}

fn config(what: impl Into<String>) -> TrimError {
    TrimError::Configuration { what: what.into() }
}

impl TrimSettings {
    /// Check the settings against the beam and aero model sizes.
    pub fn validate(&self, num_nodes: usize, num_control_surfaces: usize) -> TrimResult<()> {
        if self.cs_indices.len() != self.initial_cs_deflection.len() {
            return Err(config(format!(
                "{} control surfaces but {} initial deflections",
                self.cs_indices.len(),
                self.initial_cs_deflection.len()
            )));
        }
        if let Some(&cs) = self.cs_indices.iter().find(|&&cs| cs >= num_control_surfaces) {
            return Err(config(format!(
                "control surface {cs} not defined ({num_control_surfaces} available)"
            )));
        }
        if self.thrust_nodes.len() != self.initial_thrust.len() {
            return Err(config(format!(
                "{} thrust nodes but {} initial thrusts",
                self.thrust_nodes.len(),
                self.initial_thrust.len()
            )));
        }
        let check_nodes = |nodes: &[usize], what: &str| -> TrimResult<()> {
            match nodes.iter().find(|&&n| n >= num_nodes) {
                Some(n) => Err(config(format!(
                    "{what} node {n} out of range ({num_nodes} nodes)"
                ))),
                None => Ok(()),
            }
        };
        check_nodes(&self.thrust_nodes, "thrust")?;
        let direction_finite = self.thrust_direction.iter().all(|c| c.is_finite());
        if self.thrust_direction.norm() == 0.0 || !direction_finite {
            return Err(config("thrust direction must be a finite non-zero vector"));
        }
        if let Some(SpecialCase::DifferentialThrust {
            base_thrust_nodes,
            positive_thrust_nodes,
            negative_thrust_nodes,
            ..
        }) = &self.special_case
        {
            if !self.thrust_nodes.is_empty() {
                return Err(config(
                    "differential thrust replaces per-node thrust; thrust_nodes must be empty",
                ));
            }
            check_nodes(base_thrust_nodes, "base thrust")?;
            check_nodes(positive_thrust_nodes, "positive thrust")?;
            check_nodes(negative_thrust_nodes, "negative thrust")?;
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(config("tolerance must be positive"));
        }
        if self.max_evaluations == 0 {
            return Err(config("max_evaluations must be at least 1"));
        }
        if let TrimOutput::Component(i) = self.output {
            if i >= 6 {
                return Err(config(format!("resultant component {i} out of range 0..6")));
            }
        }
        Ok(())
    }
}
