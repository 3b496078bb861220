//! Derivative-free simplex search and a finite-difference BFGS refinement.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{TrimError, TrimResult};

/// Nelder–Mead configuration.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum objective evaluations
    pub max_evaluations: usize,
    /// Simplex size tolerance (max abs vertex spread)
    pub xatol: f64,
    /// Objective spread tolerance
    pub fatol: f64,
    /// Relative perturbation of non-zero initial entries
    pub nonzero_delta: f64,
    /// Absolute perturbation of zero initial entries
    pub zero_delta: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 1000,
            xatol: 1e-4,
            fatol: 1e-4,
            nonzero_delta: 0.05,
            zero_delta: 0.00025,
        }
    }
}

/// BFGS configuration.
#[derive(Debug, Clone)]
pub struct BfgsConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Maximum objective evaluations, including finite-difference gradient samples
    pub max_evaluations: usize,
    /// Gradient norm tolerance
    pub gtol: f64,
    /// Finite-difference step
    pub epsilon: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Sufficient-decrease constant
    pub armijo: f64,
}

impl Default for BfgsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_evaluations: 2000,
            gtol: 1e-5,
            epsilon: 0.05,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            armijo: 1e-4,
        }
    }
}

/// Minimization result.
#[derive(Debug, Clone)]
pub struct OptimResult {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective at `x`
    pub value: f64,
    /// Objective evaluations used
    pub evaluations: usize,
    /// Iterations performed
    pub iterations: usize,
    /// Tolerances met before the evaluation budget ran out
    pub converged: bool,
}

struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F> Counted<F>
where
    F: FnMut(&DVector<f64>) -> TrimResult<f64>,
{
    fn eval(&mut self, x: &DVector<f64>) -> TrimResult<f64> {
        self.evaluations += 1;
        let v = (self.f)(x)?;
        if v.is_nan() {
            return Err(TrimError::Optimizer {
                what: "objective returned NaN".to_string(),
            });
        }
        Ok(v)
    }
}

/// Minimize `f` from `x0` with the Nelder–Mead simplex method.
///
/// Standard coefficients: reflection 1, expansion 2, contraction 0.5,
/// shrink 0.5. Stops when both the vertex spread and the objective spread
/// fall within tolerance, or when the evaluation budget is spent.
pub fn nelder_mead<F>(
    x0: DVector<f64>,
    f: F,
    config: &NelderMeadConfig,
) -> TrimResult<OptimResult>
where
    F: FnMut(&DVector<f64>) -> TrimResult<f64>,
{
    const RHO: f64 = 1.0;
    const CHI: f64 = 2.0;
    const PSI: f64 = 0.5;
    const SIGMA: f64 = 0.5;

    let n = x0.len();
    if n == 0 {
        return Err(TrimError::Optimizer {
            what: "empty state vector".to_string(),
        });
    }
    let mut obj = Counted { f, evaluations: 0 };

    let mut sim: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    sim.push(x0.clone());
    for k in 0..n {
        let mut y = x0.clone();
        if y[k] != 0.0 {
            y[k] *= 1.0 + config.nonzero_delta;
        } else {
            y[k] = config.zero_delta;
        }
        sim.push(y);
    }
    let mut fsim = Vec::with_capacity(n + 1);
    for v in &sim {
        fsim.push(obj.eval(v)?);
    }

    let mut iterations = 0;
    let mut converged = false;
    loop {
        sort_simplex(&mut sim, &mut fsim);

        let x_spread = sim[1..]
            .iter()
            .map(|v| (v - &sim[0]).amax())
            .fold(0.0, f64::max);
        let f_spread = fsim[1..]
            .iter()
            .map(|v| (v - fsim[0]).abs())
            .fold(0.0, f64::max);
        if x_spread <= config.xatol && f_spread <= config.fatol {
            converged = true;
            break;
        }
        if obj.evaluations >= config.max_evaluations {
            break;
        }
        iterations += 1;

        let xbar = sim[..n].iter().fold(DVector::zeros(n), |acc, v| acc + v) / n as f64;
        let worst = sim[n].clone();

        let xr = &xbar * (1.0 + RHO) - &worst * RHO;
        let fxr = obj.eval(&xr)?;
        let mut shrink = false;

        if fxr < fsim[0] {
            let xe = &xbar * (1.0 + RHO * CHI) - &worst * (RHO * CHI);
            let fxe = obj.eval(&xe)?;
            if fxe < fxr {
                sim[n] = xe;
                fsim[n] = fxe;
            } else {
                sim[n] = xr;
                fsim[n] = fxr;
            }
        } else if fxr < fsim[n - 1] {
            sim[n] = xr;
            fsim[n] = fxr;
        } else if fxr < fsim[n] {
            let xc = &xbar * (1.0 + PSI * RHO) - &worst * (PSI * RHO);
            let fxc = obj.eval(&xc)?;
            if fxc <= fxr {
                sim[n] = xc;
                fsim[n] = fxc;
            } else {
                shrink = true;
            }
        } else {
            let xcc = &xbar * (1.0 - PSI) + &worst * PSI;
            let fxcc = obj.eval(&xcc)?;
            if fxcc < fsim[n] {
                sim[n] = xcc;
                fsim[n] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            for j in 1..=n {
                sim[j] = &sim[0] + (&sim[j] - &sim[0]) * SIGMA;
                fsim[j] = obj.eval(&sim[j])?;
            }
        }
    }

    debug!(
        iterations,
        evaluations = obj.evaluations,
        value = fsim[0],
        converged,
        "nelder-mead finished"
    );
    Ok(OptimResult {
        x: sim.swap_remove(0),
        value: fsim[0],
        evaluations: obj.evaluations,
        iterations,
        converged,
    })
}

fn sort_simplex(sim: &mut Vec<DVector<f64>>, fsim: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&a, &b| fsim[a].total_cmp(&fsim[b]));
    let sorted_sim: Vec<DVector<f64>> = order.iter().map(|&i| sim[i].clone()).collect();
    let sorted_f: Vec<f64> = order.iter().map(|&i| fsim[i]).collect();
    *sim = sorted_sim;
    *fsim = sorted_f;
}

/// Forward-difference gradient of a scalar function.
///
/// Each entry is perturbed by `epsilon * max(|x_j|, 1)`.
pub fn finite_difference_gradient<F>(
    x: &DVector<f64>,
    f_x: f64,
    mut f: F,
    epsilon: f64,
) -> TrimResult<DVector<f64>>
where
    F: FnMut(&DVector<f64>) -> TrimResult<f64>,
{
    let mut grad = DVector::zeros(x.len());
    for j in 0..x.len() {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;
        grad[j] = (f(&x_perturbed)? - f_x) / dx;
    }
    Ok(grad)
}

/// Quasi-Newton refinement with an inverse-Hessian BFGS update and
/// backtracking line search.
pub fn bfgs<F>(x0: DVector<f64>, f: F, config: &BfgsConfig) -> TrimResult<OptimResult>
where
    F: FnMut(&DVector<f64>) -> TrimResult<f64>,
{
    let n = x0.len();
    let mut obj = Counted { f, evaluations: 0 };
    let mut x = x0;
    let mut fx = obj.eval(&x)?;
    let mut g = finite_difference_gradient(&x, fx, |v| obj.eval(v), config.epsilon)?;
    let mut h_inv = DMatrix::<f64>::identity(n, n);
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        if g.norm() < config.gtol {
            converged = true;
            break;
        }
        if obj.evaluations >= config.max_evaluations {
            break;
        }
        iterations += 1;

        let mut p = -(&h_inv * &g);
        let mut slope = g.dot(&p);
        if slope >= 0.0 {
            // Lost descent; restart from steepest descent.
            h_inv = DMatrix::identity(n, n);
            p = -g.clone();
            slope = g.dot(&p);
        }

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_iters {
            let x_trial = &x + &p * alpha;
            let f_trial = obj.eval(&x_trial)?;
            if f_trial <= fx + config.armijo * alpha * slope {
                accepted = Some((x_trial, f_trial));
                break;
            }
            alpha *= config.line_search_beta;
        }
        let Some((x_new, f_new)) = accepted else {
            debug!(iterations, "bfgs line search stalled");
            break;
        };

        let g_new = finite_difference_gradient(&x_new, f_new, |v| obj.eval(v), config.epsilon)?;
        let s = &x_new - &x;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        if sy > 1e-12 {
            let rho = 1.0 / sy;
            let eye = DMatrix::<f64>::identity(n, n);
            let left = &eye - (&s * y.transpose()) * rho;
            let right = &eye - (&y * s.transpose()) * rho;
            h_inv = &left * &h_inv * &right + (&s * s.transpose()) * rho;
        }

        x = x_new;
        fx = f_new;
        g = g_new;
    }

    debug!(
        iterations,
        evaluations = obj.evaluations,
        value = fx,
        converged,
        "bfgs finished"
    );
    Ok(OptimResult {
        x,
        value: fx,
        evaluations: obj.evaluations,
        iterations,
        converged,
    })
}
