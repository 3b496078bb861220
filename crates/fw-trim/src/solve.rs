//! Trim search entry point.

use fw_coupling::{AeroSolver, CouplingDriver, StructuralSolver};
use fw_structure::Vector6;
use nalgebra::DVector;
use tracing::{info, warn};

use crate::error::{TrimError, TrimResult};
use crate::optimize::{BfgsConfig, NelderMeadConfig, bfgs, nelder_mead};
use crate::problem::{TrimProblem, weighted_objective};
use crate::settings::TrimSettings;
use crate::state::TrimStateVector;

/// Result of a trim search.
#[derive(Debug, Clone)]
pub struct TrimSolution {
    pub state: TrimStateVector,
    /// Weighted objective at the solution.
    pub objective: f64,
    /// Static resultants `[F; M]` at the solution.
    pub resultants: Vector6,
    pub evaluations: usize,
    pub converged: bool,
}

impl TrimSolution {
    pub fn alpha(&self) -> f64 {
        self.state.alpha()
    }

    pub fn beta(&self) -> f64 {
        self.state.beta()
    }

    pub fn roll(&self) -> f64 {
        self.state.roll()
    }
}

/// Search for the state that zeroes the static resultants.
///
/// Nelder–Mead first, optionally refined with BFGS. The driver's working
/// snapshot is left at the trimmed configuration.
pub fn trim<S: StructuralSolver, A: AeroSolver>(
    driver: &mut CouplingDriver<S, A>,
    settings: TrimSettings,
) -> TrimResult<TrimSolution> {
    let mut problem = TrimProblem::new(driver, settings)?;
    let x0 = problem.initial_state().values().clone();
    let nm = NelderMeadConfig {
        max_evaluations: problem.settings().max_evaluations,
        xatol: problem.settings().tolerance,
        ..NelderMeadConfig::default()
    };
    info!(unknowns = x0.len(), "starting trim search");

    let mut best = nelder_mead(x0, |x| problem.objective(x), &nm)?;
    if !best.converged {
        warn!(
            evaluations = best.evaluations,
            objective = best.value,
            "trim search ran out of evaluations"
        );
    }

    if problem.settings().refine_solution {
        let refined = bfgs(best.x.clone(), |x| problem.objective(x), &BfgsConfig::default())?;
        if refined.value <= best.value {
            best.x = refined.x;
            best.value = refined.value;
        }
        best.evaluations += refined.evaluations;
    }

    finish(&mut problem, best.x, best.evaluations, best.converged)
}

fn finish<S: StructuralSolver, A: AeroSolver>(
    problem: &mut TrimProblem<'_, S, A>,
    x: DVector<f64>,
    evaluations: usize,
    converged: bool,
) -> TrimResult<TrimSolution> {
    // Re-solve so the driver holds the trimmed state.
    let resultants = problem.resultants(&x)?;
    let objective = weighted_objective(&resultants);
    let state = TrimStateVector::from_values(problem.index().clone(), x).ok_or_else(|| {
        TrimError::Optimizer {
            what: "optimizer changed the state vector length".to_string(),
        }
    })?;
    info!(
        alpha_deg = state.alpha().to_degrees(),
        beta_deg = state.beta().to_degrees(),
        roll_deg = state.roll().to_degrees(),
        objective,
        evaluations,
        "trim found"
    );
    Ok(TrimSolution {
        state,
        objective,
        resultants,
        evaluations: evaluations + 1,
        converged,
    })
}
