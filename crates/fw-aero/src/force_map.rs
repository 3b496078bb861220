//! Aerodynamic panel-corner forces to structural nodal loads.
//!
//! Every corner force on the strip of a span station is transferred to the
//! structural node driving that station, together with the moment of the
//! force about the node. The result is a fresh load vector; mapping the same
//! aerodynamic state twice gives the same loads.

use fw_core::{NodeId, SurfId};
use fw_structure::Vector6;
use nalgebra::Vector3;

use crate::error::{AeroError, AeroResult};
use crate::mapping::NodeMapping;
use crate::timestep::{AeroTimeStepInfo, PointGrid, SurfaceState};

/// Which force field of the aerodynamic snapshot to transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceChannel {
    Steady,
    Unsteady,
}

impl ForceChannel {
    fn grid(self, surface: &SurfaceState) -> &PointGrid {
        match self {
            ForceChannel::Steady => &surface.forces,
            ForceChannel::Unsteady => &surface.dynamic_forces,
        }
    }
}

/// Nodal loads (3 force + 3 moment, body frame) from one aerodynamic channel.
pub fn map_forces(
    mapping: &NodeMapping,
    aero: &AeroTimeStepInfo,
    channel: ForceChannel,
    node_pos: &[Vector3<f64>],
) -> AeroResult<Vec<Vector6>> {
    if node_pos.len() != mapping.num_nodes() {
        return Err(AeroError::SizeMismatch {
            what: "structural node positions",
            expected: mapping.num_nodes(),
            actual: node_pos.len(),
        });
    }
    if aero.num_surfaces() != mapping.num_surfaces() {
        return Err(AeroError::SizeMismatch {
            what: "aerodynamic surfaces",
            expected: mapping.num_surfaces(),
            actual: aero.num_surfaces(),
        });
    }
    for (s, surface) in aero.surfaces.iter().enumerate() {
        let stations = mapping.span_stations(SurfId::from_usize(s));
        if surface.n + 1 != stations {
            return Err(AeroError::SizeMismatch {
                what: "span stations",
                expected: stations,
                actual: surface.n + 1,
            });
        }
    }

    let mut loads = vec![Vector6::zeros(); node_pos.len()];
    for (n, load) in loads.iter_mut().enumerate() {
        let pos = node_pos[n];
        for loc in mapping.locations(NodeId::from_usize(n)) {
            let surface = &aero.surfaces[loc.surface.idx()];
            let forces = channel.grid(surface);
            for i in 0..=surface.m {
                let f = forces.get(i, loc.span);
                let r = surface.zeta.get(i, loc.span) - pos;
                accumulate(load, &f, &r.cross(&f));
            }
        }
    }
    Ok(loads)
}

/// Sum of all nodal forces and moments about `origin`.
pub fn resultant(loads: &[Vector6], node_pos: &[Vector3<f64>], origin: &Vector3<f64>) -> Vector6 {
    let mut total = Vector6::zeros();
    for (load, pos) in loads.iter().zip(node_pos) {
        let f = load.fixed_rows::<3>(0).into_owned();
        let m = load.fixed_rows::<3>(3).into_owned() + (pos - origin).cross(&f);
        accumulate(&mut total, &f, &m);
    }
    total
}

fn accumulate(load: &mut Vector6, force: &Vector3<f64>, moment: &Vector3<f64>) {
    for k in 0..3 {
        load[k] += force[k];
        load[k + 3] += moment[k];
    }
}
