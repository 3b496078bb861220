//! Load relaxation schedule.

use fw_structure::Vector6;

use crate::settings::CouplingSettings;

/// Relaxation coefficient at substep `k`.
///
/// Ramps linearly from `relaxation_factor` to `final_relaxation_factor` over
/// `relaxation_steps` substeps and holds the final value afterwards.
pub fn relaxation_factor(settings: &CouplingSettings, k: usize) -> f64 {
    let w0 = settings.relaxation_factor;
    if !settings.dynamic_relaxation {
        return w0;
    }
    let wf = settings.final_relaxation_factor;
    if settings.relaxation_steps == 0 {
        return wf;
    }
    let steps = settings.relaxation_steps;
    w0 + (wf - w0) * k.min(steps) as f64 / steps as f64
}

/// `new = (1 - w) new + w previous`, node by node.
pub fn relax_loads(new: &mut [Vector6], previous: &[Vector6], omega: f64) {
    for (n, p) in new.iter_mut().zip(previous) {
        *n = *n * (1.0 - omega) + p * omega;
    }
}
