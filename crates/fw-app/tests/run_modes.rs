//! End-to-end runs of generated wing cases.

use std::path::PathBuf;

use fw_app::{
    AppError, RunMode, RunOutcome, RunProgressEvent, RunRequest, RunStage, compile_case,
    execute_case, run_case_with_progress, save_case, trim_settings,
};
use fw_project::schema::*;
use fw_project::RectangularWing;
use fw_trim::TrimOutput;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fw_app_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn small_wing() -> CaseDef {
    let mut case = RectangularWing {
        elements_per_side: 2,
        chordwise_panels: 4,
        semispan_m: 2.0,
        chord_m: 0.5,
        u_inf_mps: 20.0,
        alpha_deg: 3.0,
        ..RectangularWing::default()
    }
    .build();
    case.coupling.n_time_steps = 3;
    case.coupling.fsi_substeps = 100;
    case.coupling.fsi_tolerance = 1e-8;
    case.coupling.relaxation_factor = 0.3;
    case.coupling.dynamic_relaxation = false;
    case.coupling.minimum_steps = 1;
    case
}

#[test]
fn static_run_lifts_the_wing() {
    let case = small_wing();
    let response = execute_case(&case, &scratch_dir("static"), RunMode::Static, None).unwrap();
    let RunOutcome::Static {
        converged,
        resultants,
        aero_force_body,
        max_displacement_m,
        ..
    } = response.outcome
    else {
        panic!("expected a static outcome");
    };
    assert!(converged);
    assert!(aero_force_body[2] > 0.0);
    // symmetric wing: no side force, roll or yaw moment
    assert!(resultants[1].abs() < 1e-8 * aero_force_body[2]);
    assert!(resultants[3].abs() < 1e-8 * aero_force_body[2]);
    assert!(max_displacement_m > 0.0);
}

#[test]
fn dynamic_run_writes_force_history() {
    let dir = scratch_dir("dynamic");
    let mut case = small_wing();
    case.postprocessors = vec![PostProcessorDef::AeroForcesCalculator {
        text_file: Some("forces.csv".to_string()),
        screen_output: false,
    }];
    let path = dir.join("case.yaml");
    save_case(&path, &case).unwrap();

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let request = RunRequest {
        case_path: &path,
        mode: RunMode::Dynamic,
    };
    let response = run_case_with_progress(&request, Some(&mut |e| events.push(e))).unwrap();

    let RunOutcome::Dynamic {
        steps,
        converged_steps,
        ..
    } = response.outcome
    else {
        panic!("expected a dynamic outcome");
    };
    assert_eq!(steps, 3);
    assert_eq!(converged_steps, 3);

    assert_eq!(events.first().map(|e| &e.stage), Some(&RunStage::LoadingCase));
    assert!(events.iter().any(|e| e.stage == RunStage::CompilingRuntime));
    let step_events: Vec<_> = events.iter().filter_map(|e| e.dynamic.as_ref()).collect();
    assert_eq!(step_events.len(), 3);
    assert_eq!(step_events[2].step, 3);
    assert!((step_events[2].fraction_complete - 1.0).abs() < 1e-12);
    assert_eq!(events.last().map(|e| &e.stage), Some(&RunStage::Completed));

    let csv = std::fs::read_to_string(dir.join("forces.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("tstep"));
    assert!(lines[3].starts_with("3,"));
}

#[test]
fn trim_balances_weight() {
    let mut case = RectangularWing {
        elements_per_side: 2,
        chordwise_panels: 4,
        semispan_m: 2.0,
        chord_m: 0.5,
        elastic_axis: 0.5,
        u_inf_mps: 20.0,
        alpha_deg: 0.0,
        ..RectangularWing::default()
    }
    .build();
    case.coupling.fsi_tolerance = 1e-8;
    case.coupling.relaxation_factor = 0.3;
    case.coupling.dynamic_relaxation = false;
    case.coupling.minimum_steps = 1;
    case.coupling.fsi_substeps = 100;
    case.structural_solver = StructuralSolverDef::LinearSpring {
        translational_stiffness: 1.0e4,
        rotational_stiffness: 5.0e3,
        gravity: true,
        gravity_dir: [0.0, 0.0, -1.0],
        gravity_mps2: 9.80665,
    };
    case.trim = Some(TrimDef {
        thrust_nodes: vec![0],
        initial_thrust_n: vec![1.0],
        thrust_direction: [-1.0, 0.0, 0.0],
        ..TrimDef::default()
    });

    let response = execute_case(&case, &scratch_dir("trim"), RunMode::Trim, None).unwrap();
    let RunOutcome::Trim {
        converged,
        alpha_deg,
        thrust_n,
        resultants,
        ..
    } = response.outcome
    else {
        panic!("expected a trim outcome");
    };
    assert!(converged);
    assert!(alpha_deg > 0.0 && alpha_deg < 2.0, "alpha {alpha_deg}");
    assert!(thrust_n[0] > 0.0);
    assert!(resultants[2].abs() < 0.1, "Fz {}", resultants[2]);
}

#[test]
fn trim_settings_carry_the_selected_output() {
    let def = TrimDef {
        initial_alpha_deg: 2.0,
        thrust_direction: [0.0, 2.0, 0.0],
        output: TrimOutputDef::Component { index: 2 },
        ..TrimDef::default()
    };
    let settings = trim_settings(&def);
    assert_eq!(settings.output, TrimOutput::Component(2));
    assert!((settings.initial_alpha - 2.0_f64.to_radians()).abs() < 1e-15);
    assert!((settings.thrust_direction.norm() - 1.0).abs() < 1e-15);
    assert_eq!(trim_settings(&TrimDef::default()).output, TrimOutput::Weighted);
}

#[test]
fn trim_needs_a_trim_section() {
    let case = small_wing();
    let err = execute_case(&case, &scratch_dir("no_trim"), RunMode::Trim, None).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn compile_applies_flight_and_flap_state() {
    let mut case = RectangularWing {
        elements_per_side: 2,
        flap_chord_panels: Some(1),
        alpha_deg: 4.0,
        ..RectangularWing::default()
    }
    .build();
    case.aero.control_surfaces[0].deflection_deg = 5.0;
    let driver = compile_case(&case, &scratch_dir("compile")).unwrap();

    let (_, pitch, _) = driver.working().structure.quat.euler_angles();
    assert!((pitch - 4.0_f64.to_radians()).abs() < 1e-12);
    let deflection = driver.working().aero.control_surface_deflection[0];
    assert!((deflection - 5.0_f64.to_radians()).abs() < 1e-12);
    assert_eq!(driver.postprocessors().len(), 1);
}

#[test]
fn invalid_case_fails_before_compiling() {
    let mut case = small_wing();
    case.aero.surface_m[0] = 0;
    assert!(matches!(
        compile_case(&case, &scratch_dir("invalid")),
        Err(AppError::Validation(_))
    ));
}
