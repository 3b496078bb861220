//! Airfoil camber-line lookup.

use crate::error::{AeroError, AeroResult};

/// Camber line sampled on `[0, 1]` and interpolated with local quadratics.
#[derive(Debug, Clone, PartialEq)]
pub struct Airfoil {
    xs: Vec<f64>,
    zs: Vec<f64>,
}

impl Airfoil {
    /// Build a lookup from `(x, camber)` pairs sorted by strictly increasing `x`.
    ///
    /// The table must cover `[0, 1]`.
    pub fn new(points: &[(f64, f64)]) -> AeroResult<Self> {
        if points.len() < 2 {
            return Err(AeroError::config("airfoil needs at least two camber points"));
        }
        if points.iter().any(|(x, z)| !x.is_finite() || !z.is_finite()) {
            return Err(AeroError::config("airfoil camber points must be finite"));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(AeroError::config(
                "airfoil camber points must have strictly increasing x",
            ));
        }
        let (x0, x1) = (points[0].0, points[points.len() - 1].0);
        if x0 > 1e-9 || x1 < 1.0 - 1e-9 {
            return Err(AeroError::config(format!(
                "airfoil camber table spans [{x0}, {x1}], must cover [0, 1]"
            )));
        }
        Ok(Self {
            xs: points.iter().map(|p| p.0).collect(),
            zs: points.iter().map(|p| p.1).collect(),
        })
    }

    /// Symmetric (uncambered) section.
    pub fn flat() -> Self {
        Self {
            xs: vec![0.0, 1.0],
            zs: vec![0.0, 0.0],
        }
    }

    /// NACA four-digit mean line with maximum camber `m` at chord fraction `p`.
    pub fn naca_mean_line(m: f64, p: f64, n_points: usize) -> AeroResult<Self> {
        if !(0.0..1.0).contains(&p) || n_points < 3 {
            return Err(AeroError::config("invalid NACA mean-line parameters"));
        }
        let points: Vec<(f64, f64)> = (0..n_points)
            .map(|i| {
                let x = i as f64 / (n_points - 1) as f64;
                let z = if m == 0.0 || p == 0.0 {
                    0.0
                } else if x < p {
                    m / (p * p) * (2.0 * p * x - x * x)
                } else {
                    m / ((1.0 - p) * (1.0 - p)) * ((1.0 - 2.0 * p) + 2.0 * p * x - x * x)
                };
                (x, z)
            })
            .collect();
        Self::new(&points)
    }

    /// Camber height at normalised chordwise position `x`.
    pub fn camber(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 2 {
            let t = (x - self.xs[0]) / (self.xs[1] - self.xs[0]);
            return self.zs[0] + t * (self.zs[1] - self.zs[0]);
        }
        let seg = self.xs.partition_point(|&xi| xi <= x).saturating_sub(1);
        let j = seg.min(n - 3);
        let (x0, x1, x2) = (self.xs[j], self.xs[j + 1], self.xs[j + 2]);
        let (z0, z1, z2) = (self.zs[j], self.zs[j + 1], self.zs[j + 2]);
        let l0 = (x - x1) * (x - x2) / ((x0 - x1) * (x0 - x2));
        let l1 = (x - x0) * (x - x2) / ((x1 - x0) * (x1 - x2));
        let l2 = (x - x0) * (x - x1) / ((x2 - x0) * (x2 - x1));
        z0 * l0 + z1 * l1 + z2 * l2
    }
}
