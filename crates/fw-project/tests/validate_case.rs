use fw_project::schema::*;
use fw_project::{RectangularWing, ValidationError, validate_case};

fn wing() -> CaseDef {
    RectangularWing {
        elements_per_side: 2,
        ..RectangularWing::default()
    }
    .build()
}

#[test]
fn exhaustion_policy_is_required() {
    let mut value = serde_yaml::to_value(wing()).unwrap();
    let coupling = value
        .get_mut("coupling")
        .and_then(|c| c.as_mapping_mut())
        .unwrap();
    coupling.remove("exhaustion_policy");
    let err = serde_yaml::from_value::<CaseDef>(value).unwrap_err();
    assert!(err.to_string().contains("exhaustion_policy"));
}

#[test]
fn element_node_out_of_range() {
    let mut case = wing();
    case.structure.elements[1].nodes[1] = 99;
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn element_surface_out_of_range() {
    let mut case = wing();
    case.structure.elements[0].surface = Some(2);
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn aero_node_count_must_match() {
    let mut case = wing();
    case.aero.nodes.pop();
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn unsupported_distribution() {
    let mut case = wing();
    case.aero.distribution = "cosine".to_string();
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::Unsupported { .. })
    ));
}

#[test]
fn relaxation_must_stay_below_one() {
    let mut case = wing();
    case.coupling.relaxation_factor = 1.0;
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn elastic_axis_outside_chord() {
    let mut case = wing();
    case.aero.nodes[3].elastic_axis = 1.5;
    assert!(validate_case(&case).is_err());
}

#[test]
fn trim_thrust_lengths_must_match() {
    let mut case = wing();
    case.trim = Some(TrimDef {
        thrust_nodes: vec![0, 1],
        initial_thrust_n: vec![1.0],
        ..TrimDef::default()
    });
    assert!(validate_case(&case).is_err());
}

#[test]
fn trim_output_component_must_be_a_resultant() {
    let mut case = wing();
    case.trim = Some(TrimDef {
        output: TrimOutputDef::Component { index: 6 },
        ..TrimDef::default()
    });
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::InvalidValue { .. })
    ));
    case.trim = Some(TrimDef {
        output: TrimOutputDef::Component { index: 5 },
        ..TrimDef::default()
    });
    validate_case(&case).unwrap();
}

#[test]
fn trim_control_surface_must_exist() {
    let mut case = wing();
    case.trim = Some(TrimDef {
        cs_indices: vec![0],
        initial_cs_deflection_deg: vec![0.0],
        ..TrimDef::default()
    });
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn differential_thrust_excludes_node_thrust() {
    let mut case = wing();
    case.trim = Some(TrimDef {
        thrust_nodes: vec![0],
        initial_thrust_n: vec![1.0],
        special_case: Some(SpecialCaseDef::DifferentialThrust {
            initial_base_thrust_n: 1.0,
            initial_differential_parameter: 0.0,
            base_thrust_nodes: vec![],
            positive_thrust_nodes: vec![2],
            negative_thrust_nodes: vec![6],
        }),
        ..TrimDef::default()
    });
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::Unsupported { .. })
    ));
}

#[test]
fn future_version_is_rejected() {
    let mut case = wing();
    case.version = 7;
    assert!(matches!(
        validate_case(&case),
        Err(ValidationError::UnsupportedVersion { version: 7 })
    ));
}
