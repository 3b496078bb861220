//! Layout of the trim state vector.
//!
//! Order: alpha, beta, roll, control-surface deflections, node thrusts and,
//! with differential thrust, the base thrust followed by the differential
//! parameter.

use std::ops::Range;

use nalgebra::DVector;

use crate::settings::{SpecialCase, TrimSettings};

pub const ALPHA: usize = 0;
pub const BETA: usize = 1;
pub const ROLL: usize = 2;

/// Index ranges into the trim state vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimIndexMap {
    pub control_surfaces: Range<usize>,
    pub thrust: Range<usize>,
    /// Base thrust and differential parameter indices.
    pub differential: Option<(usize, usize)>,
    len: usize,
}

impl TrimIndexMap {
    pub fn from_settings(settings: &TrimSettings) -> Self {
        let cs_start = ROLL + 1;
        let control_surfaces = cs_start..cs_start + settings.cs_indices.len();
        let thrust = control_surfaces.end..control_surfaces.end + settings.thrust_nodes.len();
        let mut len = thrust.end;
        let differential = match settings.special_case {
            Some(SpecialCase::DifferentialThrust { .. }) => {
                len += 2;
                Some((thrust.end, thrust.end + 1))
            }
            None => None,
        };
        Self {
            control_surfaces,
            thrust,
            differential,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Named view over a trim state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimStateVector {
    values: DVector<f64>,
    index: TrimIndexMap,
}

impl TrimStateVector {
    /// Starting point of the search.
    pub fn initial(settings: &TrimSettings) -> Self {
        let index = TrimIndexMap::from_settings(settings);
        let mut values = DVector::zeros(index.len());
        values[ALPHA] = settings.initial_alpha;
        values[BETA] = settings.initial_beta;
        values[ROLL] = settings.initial_roll;
        for (slot, d) in index
            .control_surfaces
            .clone()
            .zip(&settings.initial_cs_deflection)
        {
            values[slot] = *d;
        }
        for (slot, t) in index.thrust.clone().zip(&settings.initial_thrust) {
            values[slot] = *t;
        }
        if let (
            Some((base, diff)),
            Some(SpecialCase::DifferentialThrust {
                initial_base_thrust,
                initial_differential_parameter,
                ..
            }),
        ) = (index.differential, &settings.special_case)
        {
            values[base] = *initial_base_thrust;
            values[diff] = *initial_differential_parameter;
        }
        Self { values, index }
    }

    /// Wrap raw optimizer values; the length must match the index map.
    pub fn from_values(index: TrimIndexMap, values: DVector<f64>) -> Option<Self> {
        (values.len() == index.len()).then_some(Self { values, index })
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn index(&self) -> &TrimIndexMap {
        &self.index
    }

    pub fn alpha(&self) -> f64 {
        self.values[ALPHA]
    }

    pub fn beta(&self) -> f64 {
        self.values[BETA]
    }

    pub fn roll(&self) -> f64 {
        self.values[ROLL]
    }

    pub fn cs_deflections(&self) -> Vec<f64> {
        self.index
            .control_surfaces
            .clone()
            .map(|i| self.values[i])
            .collect()
    }

    pub fn thrusts(&self) -> Vec<f64> {
        self.index.thrust.clone().map(|i| self.values[i]).collect()
    }

    /// Base thrust and differential parameter.
    pub fn differential(&self) -> Option<(f64, f64)> {
        self.index
            .differential
            .map(|(b, d)| (self.values[b], self.values[d]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_layout() {
        let s = TrimSettings {
            initial_alpha: 0.1,
            cs_indices: vec![0, 2],
            initial_cs_deflection: vec![0.01, -0.02],
            thrust_nodes: vec![4],
            initial_thrust: vec![3.0],
            ..TrimSettings::default()
        };
        let x = TrimStateVector::initial(&s);
        assert_eq!(x.values().len(), 6);
        assert_eq!(x.alpha(), 0.1);
        assert_eq!(x.cs_deflections(), vec![0.01, -0.02]);
        assert_eq!(x.thrusts(), vec![3.0]);
        assert_eq!(x.differential(), None);
    }

    #[test]
    fn differential_appends_two_entries() {
        let s = TrimSettings {
            special_case: Some(SpecialCase::DifferentialThrust {
                initial_base_thrust: 5.0,
                initial_differential_parameter: 0.2,
                base_thrust_nodes: vec![],
                positive_thrust_nodes: vec![1],
                negative_thrust_nodes: vec![2],
            }),
            ..TrimSettings::default()
        };
        let x = TrimStateVector::initial(&s);
        assert_eq!(x.index().differential, Some((3, 4)));
        assert_eq!(x.differential(), Some((5.0, 0.2)));
        assert!(x.thrusts().is_empty());
    }

    #[test]
    fn from_values_checks_length() {
        let index = TrimIndexMap::from_settings(&TrimSettings::default());
        assert!(TrimStateVector::from_values(index.clone(), DVector::zeros(2)).is_none());
        assert!(TrimStateVector::from_values(index, DVector::zeros(3)).is_some());
    }
}
