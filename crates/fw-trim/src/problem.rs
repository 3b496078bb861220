//! Trim residual evaluation on a coupling driver.

use fw_coupling::{AeroSolver, CouplingDriver, StructuralSolver};
use fw_structure::{Vector6, rotation::euler2quat};
use nalgebra::{DVector, Vector3};
use tracing::{debug, warn};

use crate::error::{TrimError, TrimResult};
use crate::settings::{SpecialCase, TrimOutput, TrimSettings};
use crate::state::{TrimIndexMap, TrimStateVector};

/// Weights applied to the resultant components before squaring.
pub const RESULTANT_WEIGHTS: [f64; 6] = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

/// Residual of one evaluation, shaped by [`TrimOutput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimValue {
    Scalar(f64),
    Resultants(Vector6),
}

/// Weighted squared norm of a force/moment resultant.
pub fn weighted_objective(resultants: &Vector6) -> f64 {
    resultants
        .iter()
        .zip(RESULTANT_WEIGHTS)
        .map(|(r, c)| (c * r).powi(2))
        .sum()
}

/// Binds trim settings to a coupling driver and evaluates residuals.
///
/// Every evaluation starts from the driver's latest committed snapshot, so
/// results depend only on the state vector.
pub struct TrimProblem<'d, S, A> {
    driver: &'d mut CouplingDriver<S, A>,
    settings: TrimSettings,
    index: TrimIndexMap,
    base_static: Vec<Vector6>,
    evaluations: usize,
}

impl<'d, S: StructuralSolver, A: AeroSolver> TrimProblem<'d, S, A> {
    pub fn new(driver: &'d mut CouplingDriver<S, A>, settings: TrimSettings) -> TrimResult<Self> {
        settings.validate(
            driver.beam().num_nodes(),
            driver.aero_model().num_control_surfaces(),
        )?;
        let index = TrimIndexMap::from_settings(&settings);
        let base_static = driver.forcing().static_forces().to_vec();
        Ok(Self {
            driver,
            settings,
            index,
            base_static,
            evaluations: 0,
        })
    }

    pub fn settings(&self) -> &TrimSettings {
        &self.settings
    }

    pub fn index(&self) -> &TrimIndexMap {
        &self.index
    }

    pub fn initial_state(&self) -> TrimStateVector {
        TrimStateVector::initial(&self.settings)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn driver(&self) -> &CouplingDriver<S, A> {
        self.driver
    }

    fn state(&self, x: &DVector<f64>) -> TrimResult<TrimStateVector> {
        TrimStateVector::from_values(self.index.clone(), x.clone()).ok_or_else(|| {
            TrimError::Optimizer {
                what: format!(
                    "state vector has {} entries, expected {}",
                    x.len(),
                    self.index.len()
                ),
            }
        })
    }

    /// Per-node static loads implied by a state vector.
    pub fn static_loads(&self, x: &TrimStateVector) -> Vec<Vector6> {
        let mut loads = self.base_static.clone();
        let dir = self.settings.thrust_direction;
        let mut push = |node: usize, magnitude: f64| {
            let f: Vector3<f64> = dir * magnitude;
            let mut l = loads[node];
            let sum = l.fixed_rows::<3>(0) + f;
            l.fixed_rows_mut::<3>(0).copy_from(&sum);
            loads[node] = l;
        };
        match (&self.settings.special_case, x.differential()) {
            (
                Some(SpecialCase::DifferentialThrust {
                    base_thrust_nodes,
                    positive_thrust_nodes,
                    negative_thrust_nodes,
                    ..
                }),
                Some((base, d)),
            ) => {
                for &n in base_thrust_nodes {
                    push(n, base);
                }
                for &n in positive_thrust_nodes {
                    push(n, base * (1.0 + d));
                }
                for &n in negative_thrust_nodes {
                    push(n, -base * (1.0 - d));
                }
            }
            _ => {
                for (&n, t) in self.settings.thrust_nodes.iter().zip(x.thrusts()) {
                    push(n, t);
                }
            }
        }
        loads
    }

    /// Put the driver's working state at the configuration described by `x`.
    fn apply(&mut self, x: &TrimStateVector) -> TrimResult<()> {
        self.driver.restore_working();

        let loads = self.static_loads(x);
        let forcing = self.driver.forcing_mut();
        for (node, load) in loads.into_iter().enumerate() {
            forcing.set_static_force(node, load)?;
        }

        let working = self.driver.working_mut();
        working.structure.quat = euler2quat(x.roll(), x.alpha(), x.beta());
        working.structure.zero_applied_forces();
        for (&cs, d) in self.settings.cs_indices.iter().zip(x.cs_deflections()) {
            working.aero.control_surface_deflection[cs] = d;
        }
        Ok(())
    }

    /// Static coupled resultants `[F; M]` at `x`.
    pub fn resultants(&mut self, x: &DVector<f64>) -> TrimResult<Vector6> {
        let state = self.state(x)?;
        self.apply(&state)?;
        self.evaluations += 1;
        self.driver.solve_static()?;
        let (f, m) = self.driver.resultants();
        let mut out = Vector6::zeros();
        out.fixed_rows_mut::<3>(0).copy_from(&f);
        out.fixed_rows_mut::<3>(3).copy_from(&m);
        debug!(
            evaluation = self.evaluations,
            alpha = state.alpha(),
            fz = out[2],
            my = out[4],
            "trim evaluation"
        );
        Ok(out)
    }

    /// Residual in the configured output mode.
    pub fn evaluate(&mut self, x: &DVector<f64>) -> TrimResult<TrimValue> {
        let r = self.resultants(x)?;
        Ok(match self.settings.output {
            TrimOutput::Weighted => TrimValue::Scalar(weighted_objective(&r)),
            TrimOutput::Resultants => TrimValue::Resultants(r),
            TrimOutput::Component(i) => TrimValue::Scalar(r[i]),
        })
    }

    /// Scalar minimized by the search.
    ///
    /// Weighted mode uses the weighted objective, resultant mode the plain
    /// squared norm and component mode the squared component. A diverged
    /// evaluation reports the configured penalty when one is set.
    pub fn objective(&mut self, x: &DVector<f64>) -> TrimResult<f64> {
        match self.resultants(x) {
            Ok(r) => Ok(match self.settings.output {
                TrimOutput::Weighted => weighted_objective(&r),
                TrimOutput::Resultants => r.norm_squared(),
                TrimOutput::Component(i) => r[i] * r[i],
            }),
            Err(TrimError::Coupling(e)) if e.is_divergence() => {
                match self.settings.divergence_penalty {
                    Some(penalty) => {
                        warn!(error = %e, penalty, "trim evaluation diverged");
                        self.driver.restore_working();
                        Ok(penalty)
                    }
                    None => Err(TrimError::Coupling(e)),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_double_moments() {
        let r = Vector6::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(weighted_objective(&r), 1.0 + 4.0);
        assert_eq!(weighted_objective(&Vector6::zeros()), 0.0);
    }
}
