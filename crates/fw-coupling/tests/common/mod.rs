//! Shared fixtures for coupling integration tests.

#![allow(dead_code)]

use std::f64::consts::FRAC_PI_2;

use fw_aero::{AeroInput, AeroModel, AeroNodeAttrs, Airfoil, ChordwiseDistribution, GridSettings};
use fw_core::SurfId;
use fw_coupling::{
    CouplingDriver, CouplingSettings, ExhaustionPolicy, FlatPanelSettings, FlatPanelSolver,
    LinearSpringSolver, SpringStructureSettings,
};
use fw_structure::{BeamBuilder, BeamModel, BoundaryCode};
use nalgebra::Vector3;

/// Symmetric rectangular wing, `n` three-node elements per side, clamped root.
pub fn wing(n: usize, m: usize, airfoil: Airfoil) -> (BeamModel, AeroModel) {
    let mut b = BeamBuilder::new();
    let root = b.add_node(Vector3::zeros(), BoundaryCode::CLAMPED);
    let mut surfaces = Vec::new();
    for (side, surf, psi) in [
        (1.0, 0, Vector3::new(0.0, 0.0, FRAC_PI_2)),
        (-1.0, 1, Vector3::new(0.0, 0.0, -FRAC_PI_2)),
    ] {
        let mut start = root;
        for e in 0..n {
            let y0 = side * e as f64;
            let mid = b.add_node(Vector3::new(0.0, y0 + 0.5 * side, 0.0), BoundaryCode::FREE);
            let code = if e + 1 == n {
                BoundaryCode::FREE_END
            } else {
                BoundaryCode::FREE
            };
            let end = b.add_node(Vector3::new(0.0, y0 + side, 0.0), code);
            b.set_node_mass(mid, 0.5);
            b.set_node_mass(end, 0.5);
            b.add_element_3node([start, end, mid], psi);
            surfaces.push(Some(SurfId::from_index(surf)));
            start = end;
        }
    }
    let beam = b.build().unwrap();
    let input = AeroInput {
        nodes: vec![AeroNodeAttrs::section(0.5, 0.0, 0.25, 0); beam.num_nodes()],
        surface_distribution: surfaces,
        surface_m: vec![m, m],
        distribution: ChordwiseDistribution::Uniform,
        airfoils: vec![airfoil],
        control_surfaces: Vec::new(),
    };
    let aero = AeroModel::new(&beam, input, GridSettings::default()).unwrap();
    (beam, aero)
}

pub fn settings(policy: ExhaustionPolicy) -> CouplingSettings {
    CouplingSettings {
        n_time_steps: 3,
        dt: 0.05,
        fsi_substeps: 100,
        fsi_tolerance: 1e-9,
        relaxation_factor: 0.5,
        dynamic_relaxation: false,
        minimum_steps: 2,
        ..CouplingSettings::new(policy)
    }
}

pub fn springs() -> LinearSpringSolver {
    LinearSpringSolver::new(SpringStructureSettings {
        translational_stiffness: 5.0e3,
        rotational_stiffness: 2.0e3,
        ..SpringStructureSettings::default()
    })
    .unwrap()
}

pub fn panels() -> FlatPanelSolver {
    FlatPanelSolver::new(
        FlatPanelSettings {
            rho: 1.225,
            u_inf: 20.0,
            u_inf_direction: Vector3::x(),
        },
        2,
    )
    .unwrap()
}

pub fn spring_panel_driver(
    settings: CouplingSettings,
    airfoil: Airfoil,
) -> CouplingDriver<LinearSpringSolver, FlatPanelSolver> {
    let (beam, aero) = wing(2, 4, airfoil);
    CouplingDriver::new(beam, aero, settings, springs(), panels()).unwrap()
}
