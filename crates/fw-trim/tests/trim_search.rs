//! Trim searches on a spring/flat-panel wing.

use std::f64::consts::FRAC_PI_2;

use fw_aero::{AeroInput, AeroModel, AeroNodeAttrs, Airfoil, ChordwiseDistribution, GridSettings};
use fw_core::SurfId;
use fw_coupling::{
    CouplingDriver, CouplingResult, CouplingSettings, ExhaustionPolicy, FlatPanelSettings,
    FlatPanelSolver, LinearSpringSolver, SpringStructureSettings, StructuralSolver,
};
use fw_structure::{BeamBuilder, BeamModel, BoundaryCode, StructuralTimeStep, Vector6};
use fw_trim::{SpecialCase, TrimError, TrimOutput, TrimProblem, TrimSettings, TrimValue, trim};
use nalgebra::{DVector, Vector3};

/// Two-surface wing with the elastic axis at mid chord, so lift carries no
/// pitching moment about the beam.
fn wing() -> (BeamModel, AeroModel) {
    let mut b = BeamBuilder::new();
    let root = b.add_node(Vector3::zeros(), BoundaryCode::CLAMPED);
    let mut surfaces = Vec::new();
    for (side, surf, psi) in [
        (1.0, 0, Vector3::new(0.0, 0.0, FRAC_PI_2)),
        (-1.0, 1, Vector3::new(0.0, 0.0, -FRAC_PI_2)),
    ] {
        let mut start = root;
        for e in 0..2 {
            let y0 = side * e as f64;
            let mid = b.add_node(Vector3::new(0.0, y0 + 0.5 * side, 0.0), BoundaryCode::FREE);
            let code = if e == 1 {
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
        nodes: vec![AeroNodeAttrs::section(0.5, 0.0, 0.5, 0); beam.num_nodes()],
        surface_distribution: surfaces,
        surface_m: vec![4, 4],
        distribution: ChordwiseDistribution::Uniform,
        airfoils: vec![Airfoil::flat()],
        control_surfaces: Vec::new(),
    };
    let aero = AeroModel::new(&beam, input, GridSettings::default()).unwrap();
    (beam, aero)
}

fn coupling() -> CouplingSettings {
    CouplingSettings {
        fsi_substeps: 100,
        fsi_tolerance: 1e-8,
        relaxation_factor: 0.3,
        dynamic_relaxation: false,
        minimum_steps: 1,
        ..CouplingSettings::new(ExhaustionPolicy::Warn)
    }
}

fn panels() -> FlatPanelSolver {
    FlatPanelSolver::new(
        FlatPanelSettings {
            rho: 1.225,
            u_inf: 20.0,
            u_inf_direction: Vector3::x(),
        },
        1,
    )
    .unwrap()
}

fn heavy_springs() -> LinearSpringSolver {
    LinearSpringSolver::new(SpringStructureSettings {
        translational_stiffness: 1.0e4,
        rotational_stiffness: 5.0e3,
        gravity: true,
        ..SpringStructureSettings::default()
    })
    .unwrap()
}

fn driver() -> CouplingDriver<LinearSpringSolver, FlatPanelSolver> {
    let (beam, aero) = wing();
    CouplingDriver::new(beam, aero, coupling(), heavy_springs(), panels()).unwrap()
}

/// Forward thrust at the root, pointing toward the leading edge.
fn thrust_settings() -> TrimSettings {
    TrimSettings {
        thrust_nodes: vec![0],
        initial_thrust: vec![1.0],
        thrust_direction: -Vector3::x(),
        ..TrimSettings::default()
    }
}

#[test]
fn trims_weight_with_alpha_and_thrust() {
    let mut d = driver();
    let weight = 4.0 * fw_core::units::constants::G0_MPS2;

    let solution = trim(&mut d, thrust_settings()).unwrap();

    assert!(solution.converged);
    assert!(solution.objective < 1e-2, "objective {}", solution.objective);
    assert!(solution.resultants[2].abs() < 0.1, "Fz {}", solution.resultants[2]);
    // lift slope 2 pi on 2 m^2 at q = 245 Pa balances ~39 N at under a degree
    assert!(solution.alpha() > 0.3_f64.to_radians());
    assert!(solution.alpha() < 1.5_f64.to_radians());
    let thrust = solution.state.thrusts()[0];
    assert!((thrust - weight * solution.alpha().sin()).abs() < 0.05 * weight);
    assert!(solution.roll().abs() < 1e-2);

    // trimming does not commit a step
    assert_eq!(d.history().latest_step(), 0);
    let q = d.working().structure.quat;
    let (_, pitch, _) = q.euler_angles();
    assert!((pitch - solution.alpha()).abs() < 1e-9);
}

#[test]
fn evaluations_start_from_the_same_state() {
    let mut d = driver();
    let mut problem = TrimProblem::new(&mut d, thrust_settings()).unwrap();
    let x = DVector::from_vec(vec![0.01, 0.0, 0.0, 0.4]);
    let first = problem.resultants(&x).unwrap();
    let _ = problem.resultants(&DVector::from_vec(vec![0.05, 0.0, 0.0, 3.0])).unwrap();
    let again = problem.resultants(&x).unwrap();
    assert!((first - again).norm() < 1e-9);
    assert_eq!(problem.evaluations(), 3);
}

#[test]
fn output_modes_shape_the_residual() {
    let mut d = driver();
    let x = DVector::from_vec(vec![0.02, 0.0, 0.0, 0.5]);

    let mut raw = TrimProblem::new(
        &mut d,
        TrimSettings {
            output: TrimOutput::Resultants,
            ..thrust_settings()
        },
    )
    .unwrap();
    let TrimValue::Resultants(r) = raw.evaluate(&x).unwrap() else {
        panic!("expected resultants");
    };
    drop(raw);

    let mut component = TrimProblem::new(
        &mut d,
        TrimSettings {
            output: TrimOutput::Component(2),
            ..thrust_settings()
        },
    )
    .unwrap();
    let TrimValue::Scalar(fz) = component.evaluate(&x).unwrap() else {
        panic!("expected scalar");
    };
    assert!((fz - r[2]).abs() < 1e-9 * r[2].abs().max(1.0));
    drop(component);

    let mut weighted = TrimProblem::new(&mut d, thrust_settings()).unwrap();
    let TrimValue::Scalar(w) = weighted.evaluate(&x).unwrap() else {
        panic!("expected scalar");
    };
    assert!((w - fw_trim::weighted_objective(&r)).abs() < 1e-9 * w.max(1.0));
}

#[test]
fn differential_thrust_splits_loads() {
    let mut d = driver();
    let settings = TrimSettings {
        thrust_direction: Vector3::y(),
        special_case: Some(SpecialCase::DifferentialThrust {
            initial_base_thrust: 10.0,
            initial_differential_parameter: 0.2,
            base_thrust_nodes: vec![0],
            positive_thrust_nodes: vec![2],
            negative_thrust_nodes: vec![6],
        }),
        ..TrimSettings::default()
    };
    let problem = TrimProblem::new(&mut d, settings).unwrap();
    let x = problem.initial_state();
    let loads = problem.static_loads(&x);
    assert_eq!(loads.len(), 9);
    assert_eq!(loads[0], Vector6::new(0.0, 10.0, 0.0, 0.0, 0.0, 0.0));
    assert!((loads[2][1] - 12.0).abs() < 1e-12);
    assert!((loads[6][1] + 8.0).abs() < 1e-12);
    assert_eq!(loads[1], Vector6::zeros());
}

#[test]
fn invalid_settings_are_rejected() {
    let mut d = driver();
    let settings = TrimSettings {
        thrust_nodes: vec![42],
        initial_thrust: vec![1.0],
        ..TrimSettings::default()
    };
    assert!(matches!(
        TrimProblem::new(&mut d, settings),
        Err(TrimError::Configuration { .. })
    ));
}

/// Spring structure that blows up for any pitch above 0.1 rad.
struct StallsAtHighAlpha {
    inner: LinearSpringSolver,
}

impl StructuralSolver for StallsAtHighAlpha {
    fn name(&self) -> &'static str {
        "stalls at high alpha"
    }

    fn advance(
        &mut self,
        beam: &BeamModel,
        start: &StructuralTimeStep,
        state: &mut StructuralTimeStep,
        dt: f64,
    ) -> CouplingResult<()> {
        self.inner.advance(beam, start, state, dt)
    }

    fn solve_static(&mut self, beam: &BeamModel, state: &mut StructuralTimeStep) -> CouplingResult<()> {
        self.inner.solve_static(beam, state)?;
        let (_, pitch, _) = state.quat.euler_angles();
        if pitch > 0.1 {
            state.pos[3] = Vector3::repeat(f64::INFINITY);
        }
        Ok(())
    }

    fn extract_resultants(&self, beam: &BeamModel, state: &StructuralTimeStep) -> (Vector3<f64>, Vector3<f64>) {
        self.inner.extract_resultants(beam, state)
    }
}

#[test]
fn divergence_penalty_replaces_failed_evaluations() {
    let (beam, aero) = wing();
    let springs = StallsAtHighAlpha {
        inner: heavy_springs(),
    };
    let mut d = CouplingDriver::new(beam, aero, coupling(), springs, panels()).unwrap();
    let high = DVector::from_vec(vec![0.3, 0.0, 0.0, 1.0]);
    let low = DVector::from_vec(vec![0.01, 0.0, 0.0, 1.0]);

    let mut strict = TrimProblem::new(&mut d, thrust_settings()).unwrap();
    assert!(matches!(strict.objective(&high), Err(TrimError::Coupling(e)) if e.is_divergence()));
    drop(strict);

    let mut lenient = TrimProblem::new(
        &mut d,
        TrimSettings {
            divergence_penalty: Some(1e6),
            ..thrust_settings()
        },
    )
    .unwrap();
    assert_eq!(lenient.objective(&high).unwrap(), 1e6);
    // the driver is usable again right after the penalty
    assert!(lenient.objective(&low).unwrap() < 1e6);
}
