//! Coupling settings.

use fw_core::ensure_positive;

use crate::error::{CouplingError, CouplingResult};

/// What the driver does when the substep budget runs out before convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Log the final residual and commit the step anyway.
    Warn,
    /// Abort the run with [`CouplingError::ConvergenceFailure`].
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouplingSettings {
    pub n_time_steps: usize,
    pub dt: f64,
    /// Sub-iteration budget per step; 0 runs a single uncoupled pass.
    pub fsi_substeps: usize,
    pub fsi_tolerance: f64,
    /// Initial relaxation coefficient `w0`.
    pub relaxation_factor: f64,
    /// Relaxation coefficient `wf` reached after `relaxation_steps` substeps.
    pub final_relaxation_factor: f64,
    pub relaxation_steps: usize,
    /// When false the coefficient stays at `relaxation_factor`.
    pub dynamic_relaxation: bool,
    pub minimum_steps: usize,
    /// Scale applied to the unsteady aerodynamic force channel.
    pub unsteady_force_coefficient: f64,
    /// Committed snapshots retained in history.
    pub history_capacity: usize,
    /// Worker-count hint passed to solvers.
    pub num_cores: usize,
    pub exhaustion_policy: ExhaustionPolicy,
}

impl CouplingSettings {
    pub fn new(exhaustion_policy: ExhaustionPolicy) -> Self {
        Self {
            n_time_steps: 100,
            dt: 0.05,
            fsi_substeps: 70,
            fsi_tolerance: 1e-5,
            relaxation_factor: 0.0,
            final_relaxation_factor: 0.7,
            relaxation_steps: 60,
            dynamic_relaxation: true,
            minimum_steps: 3,
            unsteady_force_coefficient: 1.0,
            history_capacity: 64,
            num_cores: 1,
            exhaustion_policy,
        }
    }

    pub fn validate(&self) -> CouplingResult<()> {
        if self.n_time_steps == 0 {
            return Err(CouplingError::config("n_time_steps must be at least 1"));
        }
        ensure_positive(self.dt, "dt")?;
        ensure_positive(self.fsi_tolerance, "fsi_tolerance")?;
        for (name, w) in [
            ("relaxation_factor", self.relaxation_factor),
            ("final_relaxation_factor", self.final_relaxation_factor),
        ] {
            if !(0.0..1.0).contains(&w) {
                return Err(CouplingError::config(format!(
                    "{name} must lie in [0, 1), got {w}"
                )));
            }
        }
        if self.minimum_steps == 0 {
            return Err(CouplingError::config("minimum_steps must be at least 1"));
        }
        if !self.unsteady_force_coefficient.is_finite() {
            return Err(CouplingError::config(
                "unsteady_force_coefficient must be finite",
            ));
        }
        if self.history_capacity == 0 {
            return Err(CouplingError::config("history_capacity must be at least 1"));
        }
        if self.num_cores == 0 {
            return Err(CouplingError::config("num_cores must be at least 1"));
        }
        Ok(())
    }
}
