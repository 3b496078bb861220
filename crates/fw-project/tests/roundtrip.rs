use fw_project::schema::*;
use fw_project::{RectangularWing, load_json, load_yaml, save_json, save_yaml, validate_case};

fn full_case() -> CaseDef {
    let mut case = RectangularWing {
        airfoil: AirfoilDef::Naca {
            m: 0.02,
            p: 0.4,
            points: 11,
        },
        flap_chord_panels: Some(1),
        ..RectangularWing::default()
    }
    .build();
    case.forcing = Some(ForcingDef {
        static_forces: vec![NodeLoadDef {
            node: 0,
            load: [-3.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        }],
        steps: vec![ForcingStepDef {
            for_vel: Some([0.0, 0.0, 0.1, 0.0, 0.0, 0.0]),
            for_acc: None,
            dynamic_forces: vec![NodeLoadDef {
                node: 4,
                load: [0.0, 0.0, 1.5, 0.0, 0.0, 0.0],
            }],
        }],
    });
    case.trim = Some(TrimDef {
        cs_indices: vec![0],
        initial_cs_deflection_deg: vec![1.0],
        thrust_nodes: vec![0],
        initial_thrust_n: vec![2.0],
        thrust_direction: [-1.0, 0.0, 0.0],
        output: TrimOutputDef::Component { index: 4 },
        ..TrimDef::default()
    });
    case
}

#[test]
fn roundtrip_yaml_generated_case() {
    let case = full_case();
    validate_case(&case).unwrap();

    let path = std::env::temp_dir().join("fw_project_roundtrip.yaml");
    save_yaml(&path, &case).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(case, loaded);
}

#[test]
fn roundtrip_json_generated_case() {
    let case = full_case();
    let path = std::env::temp_dir().join("fw_project_roundtrip.json");
    save_json(&path, &case).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(case, loaded);
}

#[test]
fn minimal_yaml_fills_defaults() {
    let yaml = r#"
version: 1
name: minimal
structure:
  nodes:
    - { pos_m: [0.0, 0.0, 0.0], boundary: 1 }
    - { pos_m: [0.0, 0.5, 0.0], mass_kg: 1.0 }
    - { pos_m: [0.0, 1.0, 0.0], boundary: -1, mass_kg: 1.0 }
  elements:
    - { nodes: [0, 2, 1], psi: [0.0, 0.0, 1.5707963267948966], surface: 0 }
aero:
  nodes:
    - { chord_m: 0.5, elastic_axis: 0.25 }
    - { chord_m: 0.5, elastic_axis: 0.25 }
    - { chord_m: 0.5, elastic_axis: 0.25 }
  surface_m: [4]
  airfoils:
    - type: Flat
flight:
  u_inf_mps: 15.0
coupling:
  exhaustion_policy: fail
"#;
    let case: CaseDef = serde_yaml::from_str(yaml).unwrap();
    validate_case(&case).unwrap();
    assert_eq!(case.coupling.exhaustion_policy, ExhaustionPolicyDef::Fail);
    assert_eq!(case.coupling.fsi_substeps, 70);
    assert_eq!(case.coupling.fsi_tolerance, 1e-5);
    assert!(case.coupling.dynamic_relaxation);
    assert_eq!(case.aero.grid, GridDef::default());
    assert_eq!(case.aero.distribution, "uniform");
    assert!(case.aero.nodes.iter().all(|n| n.aero));
    assert_eq!(case.flight.rho_kgpm3, 1.225);
    assert_eq!(case.structural_solver, StructuralSolverDef::default());
    assert_eq!(case.aero_solver, AeroSolverDef::FlatPanel);
}

#[test]
fn trim_output_reads_from_yaml() {
    let default: TrimDef = serde_yaml::from_str("tolerance: 1.0e-3").unwrap();
    assert_eq!(default.output, TrimOutputDef::Weighted);

    let yaml = "output: { type: component, index: 2 }";
    let trim: TrimDef = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(trim.output, TrimOutputDef::Component { index: 2 });
    let trim: TrimDef = serde_yaml::from_str("output: { type: resultants }").unwrap();
    assert_eq!(trim.output, TrimOutputDef::Resultants);
}
