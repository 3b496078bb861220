//! Aerodynamic state snapshot at one time index.

use nalgebra::{DMatrix, Matrix3, Vector3};

/// Row-major `rows x cols` grid of 3-vectors (chordwise rows, spanwise columns).
#[derive(Debug, Clone, PartialEq)]
pub struct PointGrid {
    rows: usize,
    cols: usize,
    data: Vec<Vector3<f64>>,
}

impl PointGrid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Vector3::zeros(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Vector3<f64> {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, v: Vector3<f64>) {
        self.data[row * self.cols + col] = v;
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut Vector3<f64> {
        &mut self.data[row * self.cols + col]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.data.iter()
    }

    pub fn fill_zero(&mut self) {
        self.data.iter_mut().for_each(|v| *v = Vector3::zeros());
    }

    pub fn sum(&self) -> Vector3<f64> {
        self.data.iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.iter().all(|x| x.is_finite()))
    }
}

/// Bound and wake state of one lifting surface with `m` chordwise and `n` spanwise panels.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub m: usize,
    pub n: usize,
    /// Bound-panel corners in the body frame, `(m + 1) x (n + 1)`.
    pub zeta: PointGrid,
    /// Wake-panel corners, `(mstar + 1) x (n + 1)`.
    pub zeta_star: PointGrid,
    /// External velocity at bound-panel corners.
    pub u_ext: PointGrid,
    pub gamma: DMatrix<f64>,
    pub gamma_star: DMatrix<f64>,
    /// Steady forces lumped at panel corners, body frame.
    pub forces: PointGrid,
    /// Unsteady forces lumped at panel corners, body frame.
    pub dynamic_forces: PointGrid,
}

impl SurfaceState {
    pub fn new(m: usize, n: usize, mstar: usize) -> Self {
        Self {
            m,
            n,
            zeta: PointGrid::zeros(m + 1, n + 1),
            zeta_star: PointGrid::zeros(mstar + 1, n + 1),
            u_ext: PointGrid::zeros(m + 1, n + 1),
            gamma: DMatrix::zeros(m, n),
            gamma_star: DMatrix::zeros(mstar, n),
            forces: PointGrid::zeros(m + 1, n + 1),
            dynamic_forces: PointGrid::zeros(m + 1, n + 1),
        }
    }

    pub fn mstar(&self) -> usize {
        self.zeta_star.rows() - 1
    }

    /// Corners of panel `(i, j)` counter-clockwise seen from the normal side.
    pub fn panel_corners(&self, i: usize, j: usize) -> [Vector3<f64>; 4] {
        [
            self.zeta.get(i, j),
            self.zeta.get(i + 1, j),
            self.zeta.get(i + 1, j + 1),
            self.zeta.get(i, j + 1),
        ]
    }

    /// Unnormalised panel normal (diagonal cross product) whose norm is twice the area.
    pub fn panel_normal_area2(&self, i: usize, j: usize) -> Vector3<f64> {
        let [a, b, c, d] = self.panel_corners(i, j);
        (c - a).cross(&(d - b))
    }
}

/// Integrated forces of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceTotals {
    pub steady_body: Vector3<f64>,
    pub unsteady_body: Vector3<f64>,
    pub steady_inertial: Vector3<f64>,
    pub unsteady_inertial: Vector3<f64>,
}

impl SurfaceTotals {
    pub fn total_body(&self) -> Vector3<f64> {
        self.steady_body + self.unsteady_body
    }

    pub fn total_inertial(&self) -> Vector3<f64> {
        self.steady_inertial + self.unsteady_inertial
    }
}

/// Aerodynamic snapshot: per-surface grids, circulation and forces.
#[derive(Debug, Clone, PartialEq)]
pub struct AeroTimeStepInfo {
    pub surfaces: Vec<SurfaceState>,
    /// Deflection of each control surface, radians, trailing edge down positive.
    pub control_surface_deflection: Vec<f64>,
    pub totals: Vec<SurfaceTotals>,
}

impl AeroTimeStepInfo {
    pub fn new(dimensions: &[(usize, usize)], mstar: usize, n_control_surfaces: usize) -> Self {
        Self {
            surfaces: dimensions
                .iter()
                .map(|&(m, n)| SurfaceState::new(m, n, mstar))
                .collect(),
            control_surface_deflection: vec![0.0; n_control_surfaces],
            totals: vec![SurfaceTotals::default(); dimensions.len()],
        }
    }

    pub fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn dimensions(&self) -> Vec<(usize, usize)> {
        self.surfaces.iter().map(|s| (s.m, s.n)).collect()
    }

    /// First non-finite aerodynamic quantity, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        for s in &self.surfaces {
            if !s.zeta.is_finite() || !s.zeta_star.is_finite() {
                return Some("aerodynamic grid");
            }
            if s.gamma.iter().chain(s.gamma_star.iter()).any(|g| !g.is_finite()) {
                return Some("circulation");
            }
            if !s.forces.is_finite() || !s.dynamic_forces.is_finite() {
                return Some("aerodynamic forces");
            }
        }
        None
    }

    /// Recompute per-surface totals; `cga` rotates body vectors to inertial.
    pub fn compute_totals(&mut self, cga: &Matrix3<f64>) {
        self.totals = self
            .surfaces
            .iter()
            .map(|s| {
                let steady_body = s.forces.sum();
                let unsteady_body = s.dynamic_forces.sum();
                SurfaceTotals {
                    steady_body,
                    unsteady_body,
                    steady_inertial: cga * steady_body,
                    unsteady_inertial: cga * unsteady_body,
                }
            })
            .collect();
    }
}
