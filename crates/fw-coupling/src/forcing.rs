//! Prescribed forcing supplied by the case input.
//!
//! Static forces (thrust and other fixed loads) enter the steady channel on
//! every substep. Per-step entries overlay reference-frame motion and add
//! dynamic nodal forces; step `t >= 1` reads entry `t - 1`.

use fw_structure::{StructuralTimeStep, Vector6};

use crate::error::{CouplingError, CouplingResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrescribedStep {
    pub for_vel: Option<Vector6>,
    pub for_acc: Option<Vector6>,
    pub dynamic_forces: Option<Vec<Vector6>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescribedForcing {
    static_forces: Vec<Vector6>,
    steps: Vec<PrescribedStep>,
}

impl PrescribedForcing {
    pub fn none(num_nodes: usize) -> Self {
        Self {
            static_forces: vec![Vector6::zeros(); num_nodes],
            steps: Vec::new(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.static_forces.len()
    }

    pub fn static_forces(&self) -> &[Vector6] {
        &self.static_forces
    }

    pub fn set_static_force(&mut self, node: usize, load: Vector6) -> CouplingResult<()> {
        let len = self.static_forces.len();
        let slot = self.static_forces.get_mut(node).ok_or_else(|| {
            CouplingError::config(format!("static force on node {node}, beam has {len} nodes"))
        })?;
        *slot = load;
        Ok(())
    }

    pub fn push_step(&mut self, step: PrescribedStep) -> CouplingResult<()> {
        if let Some(f) = &step.dynamic_forces {
            if f.len() != self.static_forces.len() {
                return Err(CouplingError::config(format!(
                    "prescribed dynamic forces for {} nodes, beam has {}",
                    f.len(),
                    self.static_forces.len()
                )));
            }
        }
        self.steps.push(step);
        Ok(())
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Entry applying to step `t`. Step 0 has none.
    pub fn entry(&self, t: usize) -> Option<&PrescribedStep> {
        t.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn dynamic_forces(&self, t: usize) -> Option<&[Vector6]> {
        self.entry(t).and_then(|e| e.dynamic_forces.as_deref())
    }

    /// Overlay prescribed reference-frame motion for step `t`.
    pub fn overlay_motion(&self, t: usize, structure: &mut StructuralTimeStep) {
        let Some(entry) = self.entry(t) else {
            return;
        };
        if let Some(v) = entry.for_vel {
            structure.for_vel = v;
        }
        if let Some(a) = entry.for_acc {
            structure.for_acc = a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_t_reads_previous_entry() {
        let mut f = PrescribedForcing::none(2);
        f.push_step(PrescribedStep {
            for_vel: Some(Vector6::repeat(1.0)),
            ..Default::default()
        })
        .unwrap();
        f.push_step(PrescribedStep {
            for_vel: Some(Vector6::repeat(2.0)),
            dynamic_forces: Some(vec![Vector6::repeat(0.5); 2]),
            ..Default::default()
        })
        .unwrap();
        assert!(f.entry(0).is_none());
        assert!(f.dynamic_forces(0).is_none());
        assert_eq!(f.entry(1).and_then(|e| e.for_vel), Some(Vector6::repeat(1.0)));
        assert_eq!(f.entry(2).and_then(|e| e.for_vel), Some(Vector6::repeat(2.0)));
        assert!(f.dynamic_forces(1).is_none());
        assert_eq!(f.dynamic_forces(2).map(|d| d.len()), Some(2));
        assert!(f.entry(3).is_none());
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut f = PrescribedForcing::none(3);
        let bad = PrescribedStep {
            dynamic_forces: Some(vec![Vector6::zeros(); 2]),
            ..Default::default()
        };
        assert!(f.push_step(bad).is_err());
        assert!(f.set_static_force(5, Vector6::zeros()).is_err());
    }
}
