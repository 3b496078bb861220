//! FSI coupling driver.
//!
//! Per step `t` the working snapshot starts as a copy of the last committed
//! one. Each substep regenerates the grid, solves the aerodynamics without
//! wake convection, maps and relaxes the loads, solves the structure and
//! evaluates the residual. The step is committed after convergence (or
//! exhaustion under [`ExhaustionPolicy::Warn`]) with a final wake-convecting
//! aerodynamic solve.

use fw_aero::{AeroModel, ForceChannel, map_forces};
use fw_core::timing::{Timer, coupling_timing};
use fw_structure::{BeamModel, StructuralTimeStep, Vector6};
use nalgebra::Vector3;
use tracing::{debug, error, info, warn};

use crate::error::{CouplingError, CouplingResult};
use crate::forcing::PrescribedForcing;
use crate::history::{CouplingSnapshot, SnapshotHistory};
use crate::postproc::{PostProcessor, PostProcessorKind};
use crate::relaxation::{relax_loads, relaxation_factor};
use crate::settings::{CouplingSettings, ExhaustionPolicy};
use crate::solvers::{AeroSolver, StructuralSolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingState {
    AwaitingStep,
    CouplingIterating { substep: usize },
    Converged,
    Diverged,
    SubstepExhausted,
    StepCommitted,
}

/// How the substep loop of one step ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Converged { iterations: usize, residual: f64 },
    /// Budget spent without meeting the tolerance; committed under the warn policy.
    SubstepExhausted { residual: f64 },
    /// `fsi_substeps = 0`: one uncoupled pass, no convergence test.
    SinglePass,
}

impl StepOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, StepOutcome::Converged { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub converged_steps: usize,
    pub exhausted_steps: usize,
    pub total_substeps: usize,
    pub max_residual: f64,
}

impl RunSummary {
    /// Fold one step outcome into the summary.
    pub fn record(&mut self, outcome: &StepOutcome, fsi_substeps: usize) {
        self.steps += 1;
        match *outcome {
            StepOutcome::Converged {
                iterations,
                residual,
            } => {
                self.converged_steps += 1;
                self.total_substeps += iterations;
                self.max_residual = self.max_residual.max(residual);
            }
            StepOutcome::SubstepExhausted { residual } => {
                self.exhausted_steps += 1;
                self.total_substeps += fsi_substeps;
                self.max_residual = self.max_residual.max(residual);
            }
            StepOutcome::SinglePass => self.total_substeps += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Dynamic,
    Static,
}

pub struct CouplingDriver<S, A> {
    beam: BeamModel,
    aero_model: AeroModel,
    settings: CouplingSettings,
    structural: S,
    aero: A,
    forcing: PrescribedForcing,
    postprocessors: Vec<PostProcessorKind>,
    history: SnapshotHistory<CouplingSnapshot>,
    working: CouplingSnapshot,
    state: CouplingState,
}

impl<S: StructuralSolver, A: AeroSolver> CouplingDriver<S, A> {
    pub fn new(
        beam: BeamModel,
        aero_model: AeroModel,
        settings: CouplingSettings,
        structural: S,
        aero: A,
    ) -> CouplingResult<Self> {
        let structure = StructuralTimeStep::initial(&beam);
        Self::with_initial_state(beam, aero_model, settings, structural, aero, structure)
    }

    /// Start from a given structural state, e.g. a pre-set orientation.
    pub fn with_initial_state(
        beam: BeamModel,
        aero_model: AeroModel,
        settings: CouplingSettings,
        structural: S,
        aero: A,
        structure: StructuralTimeStep,
    ) -> CouplingResult<Self> {
        settings.validate()?;
        if structure.num_nodes() != beam.num_nodes() {
            return Err(CouplingError::config(format!(
                "initial state has {} nodes, beam has {}",
                structure.num_nodes(),
                beam.num_nodes()
            )));
        }
        if aero_model.mapping().num_nodes() != beam.num_nodes() {
            return Err(CouplingError::config(
                "aero model was built for a different beam",
            ));
        }
        let mut aero_state = aero_model.initial_step(&structure)?;
        aero_state.compute_totals(&structure.cga());
        let initial = CouplingSnapshot {
            structure,
            aero: aero_state,
        };
        info!(
            structural = structural.name(),
            aero = aero.name(),
            nodes = beam.num_nodes(),
            surfaces = aero_model.mapping().num_surfaces(),
            substeps = settings.fsi_substeps,
            "coupling driver ready"
        );
        Ok(Self {
            forcing: PrescribedForcing::none(beam.num_nodes()),
            history: SnapshotHistory::new(initial.clone(), settings.history_capacity),
            working: initial,
            state: CouplingState::AwaitingStep,
            postprocessors: Vec::new(),
            beam,
            aero_model,
            settings,
            structural,
            aero,
        })
    }

    pub fn set_forcing(&mut self, forcing: PrescribedForcing) -> CouplingResult<()> {
        if forcing.num_nodes() != self.beam.num_nodes() {
            return Err(CouplingError::config(format!(
                "forcing defined for {} nodes, beam has {}",
                forcing.num_nodes(),
                self.beam.num_nodes()
            )));
        }
        self.forcing = forcing;
        Ok(())
    }

    pub fn add_postprocessor(&mut self, p: PostProcessorKind) {
        self.postprocessors.push(p);
    }

    pub fn postprocessors(&self) -> &[PostProcessorKind] {
        &self.postprocessors
    }

    pub fn state(&self) -> CouplingState {
        self.state
    }

    pub fn beam(&self) -> &BeamModel {
        &self.beam
    }

    pub fn aero_model(&self) -> &AeroModel {
        &self.aero_model
    }

    pub fn settings(&self) -> &CouplingSettings {
        &self.settings
    }

    pub fn forcing(&self) -> &PrescribedForcing {
        &self.forcing
    }

    pub fn forcing_mut(&mut self) -> &mut PrescribedForcing {
        &mut self.forcing
    }

    pub fn structural_solver(&self) -> &S {
        &self.structural
    }

    pub fn history(&self) -> &SnapshotHistory<CouplingSnapshot> {
        &self.history
    }

    /// Uncommitted snapshot the substep loop works on.
    pub fn working(&self) -> &CouplingSnapshot {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut CouplingSnapshot {
        &mut self.working
    }

    /// Net external force and moment of the working state.
    pub fn resultants(&self) -> (Vector3<f64>, Vector3<f64>) {
        self.structural
            .extract_resultants(&self.beam, &self.working.structure)
    }

    /// Discard the working snapshot and any divergence, keeping history.
    pub fn restore_working(&mut self) {
        self.working = self.history.latest().clone();
        self.state = CouplingState::AwaitingStep;
    }

    /// Return to step 0.
    pub fn reset(&mut self) {
        self.history.reset_to_initial();
        self.restore_working();
    }

    /// Run `n_time_steps` steps.
    pub fn run(&mut self) -> CouplingResult<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..self.settings.n_time_steps {
            let report = self.step()?;
            summary.record(&report.outcome, self.settings.fsi_substeps);
        }
        coupling_timing::log_summary();
        info!(
            steps = summary.steps,
            converged = summary.converged_steps,
            exhausted = summary.exhausted_steps,
            "coupled run finished"
        );
        Ok(summary)
    }

    /// Advance one time step and commit it.
    pub fn step(&mut self) -> CouplingResult<StepReport> {
        if self.state == CouplingState::Diverged {
            return Err(CouplingError::InvalidState {
                what: "driver diverged; reset or restore before stepping",
            });
        }
        let t = self.history.latest_step() + 1;
        self.working = self.history.latest().clone();
        self.forcing.overlay_motion(t, &mut self.working.structure);

        let outcome = self.iterate(t, Mode::Dynamic)?;
        self.commit(t)?;
        Ok(StepReport { step: t, outcome })
    }

    /// Couple to static equilibrium in place at the current step.
    ///
    /// Works on the working snapshot as left by the caller (orientation,
    /// deflections, forcing) and does not commit.
    pub fn solve_static(&mut self) -> CouplingResult<StepOutcome> {
        if self.state == CouplingState::Diverged {
            return Err(CouplingError::InvalidState {
                what: "driver diverged; reset or restore before solving",
            });
        }
        let t = self.history.latest_step();
        self.iterate(t, Mode::Static)
    }

    fn iterate(&mut self, t: usize, mode: Mode) -> CouplingResult<StepOutcome> {
        let passes = self.settings.fsi_substeps.max(1);
        let start = self.working.structure.clone();
        let mut residual = 0.0;

        for k in 0..passes {
            self.state = CouplingState::CouplingIterating { substep: k };
            let previous = self.working.structure.clone();

            let timer = Timer::start();
            self.aero_model
                .update_grid(&self.working.structure, &mut self.working.aero)?;
            timer.stop_into(&coupling_timing::GRID_GENERATION);

            let timer = Timer::start();
            self.aero.solve(
                &self.working.structure,
                &mut self.working.aero,
                false,
                self.settings.dt,
            )?;
            timer.stop_into(&coupling_timing::AERO_SOLVE);
            if let Some(what) = self.working.aero.first_non_finite() {
                return Err(self.diverged(t, k, what));
            }

            let timer = Timer::start();
            let (steady, unsteady) = self.mapped_loads(t)?;
            timer.stop_into(&coupling_timing::FORCE_MAPPING);
            let omega = relaxation_factor(&self.settings, k);
            let structure = &mut self.working.structure;
            structure.steady_applied_forces = steady;
            structure.unsteady_applied_forces = unsteady;
            if omega > 0.0 {
                relax_loads(
                    &mut structure.steady_applied_forces,
                    &previous.steady_applied_forces,
                    omega,
                );
                relax_loads(
                    &mut structure.unsteady_applied_forces,
                    &previous.unsteady_applied_forces,
                    omega,
                );
            }

            let timer = Timer::start();
            match mode {
                Mode::Dynamic => self.structural.advance(
                    &self.beam,
                    &start,
                    &mut self.working.structure,
                    self.settings.dt,
                )?,
                Mode::Static => self
                    .structural
                    .solve_static(&self.beam, &mut self.working.structure)?,
            }
            timer.stop_into(&coupling_timing::STRUCT_SOLVE);
            if let Some(what) = self.working.structure.first_non_finite() {
                return Err(self.diverged(t, k, what));
            }

            residual = if k == 0 {
                0.0
            } else {
                match mode {
                    Mode::Dynamic => relative_change(
                        &self.working.structure.pos_dot,
                        &previous.pos_dot,
                        self.settings.fsi_tolerance,
                    ),
                    Mode::Static => {
                        let rest = self.beam.pos_ini();
                        let now = displacement(&self.working.structure.pos, rest);
                        let before = displacement(&previous.pos, rest);
                        relative_change(&now, &before, self.settings.fsi_tolerance)
                    }
                }
            };
            debug!(step = t, substep = k, residual, omega, "fsi substep");

            if k >= self.settings.minimum_steps && residual < self.settings.fsi_tolerance {
                self.state = CouplingState::Converged;
                debug!(step = t, iterations = k + 1, residual, "fsi converged");
                return Ok(StepOutcome::Converged {
                    iterations: k + 1,
                    residual,
                });
            }
        }

        if self.settings.fsi_substeps == 0 {
            self.state = CouplingState::Converged;
            return Ok(StepOutcome::SinglePass);
        }

        self.state = CouplingState::SubstepExhausted;
        match self.settings.exhaustion_policy {
            ExhaustionPolicy::Warn => {
                warn!(
                    step = t,
                    substeps = self.settings.fsi_substeps,
                    residual,
                    "fsi substeps exhausted without convergence"
                );
                Ok(StepOutcome::SubstepExhausted { residual })
            }
            ExhaustionPolicy::Fail => Err(CouplingError::ConvergenceFailure {
                step: t,
                substeps: self.settings.fsi_substeps,
                residual,
            }),
        }
    }

    /// Aerodynamic nodal loads combined with prescribed forcing.
    fn mapped_loads(&self, t: usize) -> CouplingResult<(Vec<Vector6>, Vec<Vector6>)> {
        let mapping = self.aero_model.mapping();
        let pos = &self.working.structure.pos;
        let mut steady = map_forces(mapping, &self.working.aero, ForceChannel::Steady, pos)?;
        let mut unsteady = map_forces(mapping, &self.working.aero, ForceChannel::Unsteady, pos)?;

        for (l, f) in steady.iter_mut().zip(self.forcing.static_forces()) {
            *l += f;
        }
        let coeff = self.settings.unsteady_force_coefficient;
        unsteady.iter_mut().for_each(|l| *l *= coeff);
        if let Some(dynamic) = self.forcing.dynamic_forces(t) {
            for (l, f) in unsteady.iter_mut().zip(dynamic) {
                *l += f;
            }
        }
        Ok((steady, unsteady))
    }

    fn diverged(&mut self, step: usize, substep: usize, what: &'static str) -> CouplingError {
        self.state = CouplingState::Diverged;
        error!(step, substep, what, "numerical divergence");
        CouplingError::NumericalDivergence {
            step,
            substep,
            what,
        }
    }

    fn commit(&mut self, t: usize) -> CouplingResult<()> {
        let dt = self.settings.dt;
        let snapshot = &mut self.working;
        snapshot.structure.integrate_position(dt);
        self.aero_model
            .update_grid(&snapshot.structure, &mut snapshot.aero)?;
        self.aero
            .solve(&snapshot.structure, &mut snapshot.aero, true, dt)?;
        if let Some(what) = snapshot.aero.first_non_finite() {
            return Err(self.diverged(t, self.settings.fsi_substeps, what));
        }
        snapshot.aero.compute_totals(&snapshot.structure.cga());

        let step = self.history.commit(self.working.clone());
        self.state = CouplingState::StepCommitted;
        info!(step, "step committed");

        let committed = self.history.latest();
        for p in &mut self.postprocessors {
            if let Err(e) = p.run(step, committed) {
                warn!(step, postprocessor = p.name(), error = %e, "post-processor failed");
            }
        }
        self.state = CouplingState::AwaitingStep;
        Ok(())
    }
}

fn displacement(pos: &[Vector3<f64>], rest: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    pos.iter().zip(rest).map(|(p, r)| p - r).collect()
}

/// `|a - b| / |b|` over stacked nodal vectors.
///
/// Once `|b|` is at or below `floor` the absolute change `|a - b|` is
/// returned instead.
pub fn relative_change(a: &[Vector3<f64>], b: &[Vector3<f64>], floor: f64) -> f64 {
    let diff: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm_squared())
        .sum::<f64>()
        .sqrt();
    let base: f64 = b.iter().map(|y| y.norm_squared()).sum::<f64>().sqrt();
    if base > floor { diff / base } else { diff }
}
