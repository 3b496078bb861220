//! Run execution service.

use std::path::Path;
use std::time::Instant;

use fw_coupling::{RunSummary, StandardDriver, StepOutcome};
use fw_project::schema::CaseDef;
use nalgebra::Vector3;
use serde::Serialize;

use crate::case_service;
use crate::error::{AppError, AppResult};
use crate::progress::{DynamicProgress, RunProgressEvent, RunStage};
use crate::runtime_compile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Coupled static equilibrium at the case's flight condition.
    Static,
    /// `n_time_steps` committed coupled steps.
    Dynamic,
    /// Trim search with the case's trim settings.
    Trim,
}

/// Request to execute a case file.
pub struct RunRequest<'a> {
    pub case_path: &'a Path,
    pub mode: RunMode,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunOutcome {
    Static {
        converged: bool,
        substeps: usize,
        residual: f64,
        /// `[fx, fy, fz, mx, my, mz]` about the body origin.
        resultants: [f64; 6],
        aero_force_body: [f64; 3],
        max_displacement_m: f64,
    },
    Dynamic {
        steps: usize,
        converged_steps: usize,
        exhausted_steps: usize,
        total_substeps: usize,
        max_residual: f64,
        aero_force_inertial: [f64; 3],
        max_displacement_m: f64,
    },
    Trim {
        converged: bool,
        alpha_deg: f64,
        beta_deg: f64,
        roll_deg: f64,
        cs_deflection_deg: Vec<f64>,
        thrust_n: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        differential_thrust: Option<[f64; 2]>,
        objective: f64,
        resultants: [f64; 6],
        evaluations: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub case_name: String,
    pub outcome: RunOutcome,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: RunMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    dynamic: Option<DynamicProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            mode,
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            dynamic,
        });
    }
}

/// Load and execute a case file.
pub fn run_case(request: &RunRequest) -> AppResult<RunResponse> {
    run_case_with_progress(request, None)
}

/// Load and execute a case file, streaming progress events.
pub fn run_case_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        request.mode,
        RunStage::LoadingCase,
        started,
        Some(request.case_path.display().to_string()),
        None,
    );
    let case = case_service::load_case(request.case_path)?;
    let base_dir = request.case_path.parent().unwrap_or_else(|| Path::new("."));
    execute_case(&case, base_dir, request.mode, progress_cb)
}

/// Execute an in-memory case.
pub fn execute_case(
    case: &CaseDef,
    base_dir: &Path,
    mode: RunMode,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::CompilingRuntime,
        started,
        None,
        None,
    );
    let compile_start = Instant::now();
    let mut driver = runtime_compile::compile_case(case, base_dir)?;
    timing.compile_time_s = compile_start.elapsed().as_secs_f64();

    let solve_start = Instant::now();
    let outcome = match mode {
        RunMode::Static => {
            emit_progress(&mut progress_cb, mode, RunStage::SolvingStatic, started, None, None);
            run_static(&mut driver)?
        }
        RunMode::Dynamic => run_dynamic(&mut driver, mode, started, &mut progress_cb)?,
        RunMode::Trim => {
            let trim = case.trim.as_ref().ok_or_else(|| {
                AppError::InvalidInput(format!("case '{}' has no trim section", case.name))
            })?;
            emit_progress(&mut progress_cb, mode, RunStage::Trimming, started, None, None);
            run_trim(&mut driver, runtime_compile::trim_settings(trim))?
        }
    };
    timing.solve_time_s = solve_start.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, mode, RunStage::Completed, started, None, None);
    Ok(RunResponse {
        case_name: case.name.clone(),
        outcome,
        timing,
    })
}

fn array3(v: Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn max_displacement(driver: &StandardDriver) -> f64 {
    driver
        .working()
        .structure
        .pos
        .iter()
        .zip(driver.beam().pos_ini())
        .map(|(p, p0)| (p - p0).norm())
        .fold(0.0, f64::max)
}

fn resultants6(driver: &StandardDriver) -> [f64; 6] {
    let (f, m) = driver.resultants();
    [f.x, f.y, f.z, m.x, m.y, m.z]
}

fn run_static(driver: &mut StandardDriver) -> AppResult<RunOutcome> {
    let step_outcome = driver.solve_static()?;
    let (converged, substeps, residual) = match step_outcome {
        StepOutcome::Converged {
            iterations,
            residual,
        } => (true, iterations, residual),
        StepOutcome::SubstepExhausted { residual } => {
            (false, driver.settings().fsi_substeps, residual)
        }
        StepOutcome::SinglePass => (false, 1, 0.0),
    };
    let cga = driver.working().structure.cga();
    let aero = &mut driver.working_mut().aero;
    aero.compute_totals(&cga);
    let aero_force: Vector3<f64> = aero.totals.iter().map(|t| t.total_body()).sum();
    Ok(RunOutcome::Static {
        converged,
        substeps,
        residual,
        resultants: resultants6(driver),
        aero_force_body: array3(aero_force),
        max_displacement_m: max_displacement(driver),
    })
}

fn run_dynamic(
    driver: &mut StandardDriver,
    mode: RunMode,
    started: Instant,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunOutcome> {
    let n = driver.settings().n_time_steps;
    let mut summary = RunSummary::default();
    for i in 0..n {
        let report = driver.step()?;
        summary.record(&report.outcome, driver.settings().fsi_substeps);
        let residual = match report.outcome {
            StepOutcome::Converged { residual, .. }
            | StepOutcome::SubstepExhausted { residual } => Some(residual),
            StepOutcome::SinglePass => None,
        };
        emit_progress(
            progress_cb,
            mode,
            RunStage::RunningDynamic,
            started,
            None,
            Some(DynamicProgress {
                step: report.step,
                n_time_steps: n,
                fraction_complete: (i + 1) as f64 / n as f64,
                converged: report.outcome.is_converged(),
                residual,
            }),
        );
    }
    fw_core::timing::coupling_timing::log_summary();
    let aero_force: Vector3<f64> = driver
        .history()
        .latest()
        .aero
        .totals
        .iter()
        .map(|t| t.total_inertial())
        .sum();
    Ok(RunOutcome::Dynamic {
        steps: summary.steps,
        converged_steps: summary.converged_steps,
        exhausted_steps: summary.exhausted_steps,
        total_substeps: summary.total_substeps,
        max_residual: summary.max_residual,
        aero_force_inertial: array3(aero_force),
        max_displacement_m: max_displacement(driver),
    })
}

fn run_trim(driver: &mut StandardDriver, settings: fw_trim::TrimSettings) -> AppResult<RunOutcome> {
    let solution = fw_trim::trim(driver, settings)?;
    let r = solution.resultants;
    Ok(RunOutcome::Trim {
        converged: solution.converged,
        alpha_deg: solution.alpha().to_degrees(),
        beta_deg: solution.beta().to_degrees(),
        roll_deg: solution.roll().to_degrees(),
        cs_deflection_deg: solution
            .state
            .cs_deflections()
            .iter()
            .map(|d| d.to_degrees())
            .collect(),
        thrust_n: solution.state.thrusts(),
        differential_thrust: solution.state.differential().map(|(b, d)| [b, d]),
        objective: solution.objective,
        resultants: [r[0], r[1], r[2], r[3], r[4], r[5]],
        evaluations: solution.evaluations,
    })
}
