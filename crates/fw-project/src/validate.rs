//! Case validation.
//!
//! Checks references and ranges that serde cannot express. Geometry-level
//! consistency (surface coverage, airfoil tables) is checked again when the
//! runtime models are built.

use std::collections::HashSet;

use crate::schema::{
    AeroDef, AirfoilDef, CaseDef, CouplingDef, FlightConditionDef, ForcingDef, NodeLoadDef,
    SpecialCaseDef, StructuralSolverDef, StructureDef, TrimDef, TrimOutputDef,
};

pub const CASE_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(id: usize, context: impl Into<String>) -> ValidationError {
    ValidationError::MissingReference {
        id: id.to_string(),
        context: context.into(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn direction(field: &str, v: &[f64; 3]) -> Result<(), ValidationError> {
    let norm2: f64 = v.iter().map(|c| c * c).sum();
    if v.iter().all(|c| c.is_finite()) && norm2 > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v:?}"), "must be a finite non-zero vector"))
    }
}

pub fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > CASE_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    validate_structure(&case.structure, case.aero.surface_m.len())?;
    let num_nodes = case.structure.nodes.len();
    validate_aero(&case.aero, num_nodes)?;
    validate_flight(&case.flight)?;
    validate_coupling(&case.coupling)?;
    validate_solver(&case.structural_solver)?;
    if let Some(forcing) = &case.forcing {
        validate_forcing(forcing, num_nodes)?;
    }
    if let Some(trim) = &case.trim {
        validate_trim(trim, num_nodes, case.aero.control_surfaces.len())?;
    }
    Ok(())
}

fn validate_structure(s: &StructureDef, num_surfaces: usize) -> Result<(), ValidationError> {
    if s.nodes.is_empty() {
        return Err(invalid("structure.nodes", 0, "at least one node required"));
    }
    if s.elements.is_empty() {
        return Err(invalid("structure.elements", 0, "at least one element required"));
    }
    for (i, n) in s.nodes.iter().enumerate() {
        if !n.pos_m.iter().all(|c| c.is_finite()) {
            return Err(invalid(
                format!("structure.nodes[{i}].pos_m"),
                format!("{:?}", n.pos_m),
                "must be finite",
            ));
        }
        if !(n.mass_kg.is_finite() && n.mass_kg >= 0.0) {
            return Err(invalid(
                format!("structure.nodes[{i}].mass_kg"),
                n.mass_kg,
                "must be non-negative",
            ));
        }
        if !(-1..=2).contains(&n.boundary) {
            return Err(invalid(
                format!("structure.nodes[{i}].boundary"),
                n.boundary,
                "expected -1,
                0,
                1 or 2",
            ));
        }
    }
    for (e, el) in s.elements.iter().enumerate() {
        if el.nodes.len() < 2 {
            return Err(invalid(
                format!("structure.elements[{e}].nodes"),
                el.nodes.len(),
                "at least two nodes",
            ));
        }
        if let Some(&n) = el.nodes.iter().find(|&&n| n >= s.nodes.len()) {
            return Err(missing(n, format!("structure.elements[{e}].nodes")));
        }
        if let Some(ordering) = &el.ordering {
            let unique: HashSet<usize> = ordering.iter().copied().collect();
            let is_permutation = ordering.len() == el.nodes.len()
                && unique.len() == ordering.len()
                && ordering.iter().all(|&o| o < el.nodes.len());
            if !is_permutation {
                return Err(invalid(
                    format!("structure.elements[{e}].ordering"),
                    format!("{ordering:?}"),
                    "must permute the element's local nodes",
                ));
            }
        }
        if !el.psi.iter().all(|c| c.is_finite()) {
            return Err(invalid(
                format!("structure.elements[{e}].psi"),
                format!("{:?}", el.psi),
                "must be finite",
            ));
        }
        if let Some(surface) = el.surface {
            if surface >= num_surfaces {
                return Err(missing(surface, format!("structure.elements[{e}].surface")));
            }
        }
    }
    Ok(())
}

fn validate_aero(a: &AeroDef, num_nodes: usize) -> Result<(), ValidationError> {
    if a.nodes.len() != num_nodes {
        return Err(invalid("aero.nodes", a.nodes.len(), "one entry per structural node required"));
    }
    if a.distribution.trim().to_ascii_lowercase() != "uniform" {
        return Err(ValidationError::Unsupported {
            feature: format!("chordwise distribution '{}'", a.distribution),
            reason: "only uniform panels are available".to_string(),
        });
    }
    if let Some(i) = a.surface_m.iter().position(|&m| m == 0) {
        return Err(invalid(
            format!("aero.surface_m[{i}]"),
            0,
            "needs at least one chordwise panel",
        ));
    }
    if a.airfoils.is_empty() {
        return Err(invalid("aero.airfoils", 0, "at least one airfoil required"));
    }
    for (i, af) in a.airfoils.iter().enumerate() {
        match af {
            AirfoilDef::Flat => {}
            AirfoilDef::Naca { m, p, points } => {
                if !(m.is_finite() && (0.0..0.5).contains(m)) {
                    return Err(invalid(
                        format!("aero.airfoils[{i}].m"),
                        m,
                        "expected a chord fraction below 0.5",
                    ));
                }
                if !(p.is_finite() && *p > 0.0 && *p < 1.0) {
                    return Err(invalid(format!("aero.airfoils[{i}].p"), p, "must lie in (0, 1)"));
                }
                if *points < 2 {
                    return Err(invalid(
                        format!("aero.airfoils[{i}].points"),
                        points,
                        "at least two points",
                    ));
                }
            }
            AirfoilDef::Table { points } => {
                if points.len() < 2 {
                    return Err(invalid(
                        format!("aero.airfoils[{i}].points"),
                        points.len(),
                        "at least two points",
                    ));
                }
            }
        }
    }
    for (i, cs) in a.control_surfaces.iter().enumerate() {
        if cs.chord_panels == 0 {
            return Err(invalid(
                format!("aero.control_surfaces[{i}].chord_panels"),
                0,
                "at least one panel",
            ));
        }
        if !cs.deflection_deg.is_finite() {
            return Err(invalid(
                format!("aero.control_surfaces[{i}].deflection_deg"),
                cs.deflection_deg,
                "must be finite",
            ));
        }
    }
    for (i, n) in a.nodes.iter().enumerate() {
        if !n.aero {
            continue;
        }
        positive(&format!("aero.nodes[{i}].chord_m"), n.chord_m)?;
        if !n.twist_deg.is_finite() {
            return Err(invalid(
                format!("aero.nodes[{i}].twist_deg"),
                n.twist_deg,
                "must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&n.elastic_axis) {
            return Err(invalid(
                format!("aero.nodes[{i}].elastic_axis"),
                n.elastic_axis,
                "must lie in [0, 1]",
            ));
        }
        if n.airfoil >= a.airfoils.len() {
            return Err(missing(n.airfoil, format!("aero.nodes[{i}].airfoil")));
        }
        if let Some(cs) = n.control_surface {
            if cs >= a.control_surfaces.len() {
                return Err(missing(cs, format!("aero.nodes[{i}].control_surface")));
            }
        }
    }
    direction("aero.grid.freestream_dir", &a.grid.freestream_dir)
}

fn validate_flight(f: &FlightConditionDef) -> Result<(), ValidationError> {
    positive("flight.rho_kgpm3", f.rho_kgpm3)?;
    positive("flight.u_inf_mps", f.u_inf_mps)?;
    direction("flight.u_inf_direction", &f.u_inf_direction)?;
    for (field, v) in [
        ("flight.alpha_deg", f.alpha_deg),
        ("flight.beta_deg", f.beta_deg),
        ("flight.roll_deg", f.roll_deg),
    ] {
        if !v.is_finite() {
            return Err(invalid(field, v, "must be finite"));
        }
    }
    Ok(())
}

fn validate_coupling(c: &CouplingDef) -> Result<(), ValidationError> {
    if c.n_time_steps == 0 {
        return Err(invalid("coupling.n_time_steps", 0, "at least one step"));
    }
    positive("coupling.dt_s", c.dt_s)?;
    positive("coupling.fsi_tolerance", c.fsi_tolerance)?;
    for (field, w) in [
        ("coupling.relaxation_factor", c.relaxation_factor),
        ("coupling.final_relaxation_factor", c.final_relaxation_factor),
    ] {
        if !(0.0..1.0).contains(&w) {
            return Err(invalid(field, w, "must lie in [0, 1)"));
        }
    }
    if !c.unsteady_force_coefficient.is_finite() {
        return Err(invalid(
            "coupling.unsteady_force_coefficient",
            c.unsteady_force_coefficient,
            "must be finite",
        ));
    }
    if c.history_capacity == 0 {
        return Err(invalid("coupling.history_capacity", 0, "at least one snapshot"));
    }
    if c.num_cores == 0 {
        return Err(invalid("coupling.num_cores", 0, "at least one worker"));
    }
    Ok(())
}

fn validate_solver(s: &StructuralSolverDef) -> Result<(), ValidationError> {
    match s {
        StructuralSolverDef::LinearSpring {
            translational_stiffness,
            rotational_stiffness,
            gravity_dir,
            gravity_mps2,
            ..
        } => {
            positive("structural_solver.translational_stiffness", *translational_stiffness)?;
            positive("structural_solver.rotational_stiffness", *rotational_stiffness)?;
            direction("structural_solver.gravity_dir", gravity_dir)?;
            if !(gravity_mps2.is_finite() && *gravity_mps2 >= 0.0) {
                return Err(invalid(
                    "structural_solver.gravity_mps2",
                    gravity_mps2,
                    "must be non-negative",
                ));
            }
        }
    }
    Ok(())
}

fn validate_loads(
    loads: &[NodeLoadDef],
    num_nodes: usize,
    context: &str,
) -> Result<(), ValidationError> {
    for l in loads {
        if l.node >= num_nodes {
            return Err(missing(l.node, context));
        }
        if !l.load.iter().all(|c| c.is_finite()) {
            return Err(invalid(context, format!("{:?}", l.load), "must be finite"));
        }
    }
    Ok(())
}

fn validate_forcing(f: &ForcingDef, num_nodes: usize) -> Result<(), ValidationError> {
    validate_loads(&f.static_forces, num_nodes, "forcing.static_forces")?;
    for (t, step) in f.steps.iter().enumerate() {
        let context = format!("forcing.steps[{t}].dynamic_forces");
        validate_loads(&step.dynamic_forces, num_nodes, &context)?;
        for v in [step.for_vel, step.for_acc].into_iter().flatten() {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(invalid(
                    format!("forcing.steps[{t}]"),
                    format!("{v:?}"),
                    "motion must be finite",
                ));
            }
        }
    }
    Ok(())
}

fn validate_trim(t: &TrimDef, num_nodes: usize, num_cs: usize) -> Result<(), ValidationError> {
    if t.cs_indices.len() != t.initial_cs_deflection_deg.len() {
        return Err(invalid(
            "trim.initial_cs_deflection_deg",
            t.initial_cs_deflection_deg.len(),
            "one entry per control surface index",
        ));
    }
    if let Some(&cs) = t.cs_indices.iter().find(|&&cs| cs >= num_cs) {
        return Err(missing(cs, "trim.cs_indices"));
    }
    if t.thrust_nodes.len() != t.initial_thrust_n.len() {
        return Err(invalid(
            "trim.initial_thrust_n",
            t.initial_thrust_n.len(),
            "one entry per thrust node",
        ));
    }
    if let Some(&n) = t.thrust_nodes.iter().find(|&&n| n >= num_nodes) {
        return Err(missing(n, "trim.thrust_nodes"));
    }
    direction("trim.thrust_direction", &t.thrust_direction)?;
    positive("trim.tolerance", t.tolerance)?;
    if t.max_evaluations == 0 {
        return Err(invalid("trim.max_evaluations", 0, "at least one evaluation"));
    }
    if let TrimOutputDef::Component { index } = t.output {
        if index >= 6 {
            return Err(invalid("trim.output.index", index, "a resultant component 0..6"));
        }
    }
    if let Some(SpecialCaseDef::DifferentialThrust {
        base_thrust_nodes,
        positive_thrust_nodes,
        negative_thrust_nodes,
        ..
    }) = &t.special_case
    {
        if !t.thrust_nodes.is_empty() {
            return Err(ValidationError::Unsupported {
                feature: "trim.thrust_nodes with differential thrust".to_string(),
                reason: "differential thrust replaces per-node thrust".to_string(),
            });
        }
        for (nodes, context) in [
            (base_thrust_nodes, "trim.special_case.base_thrust_nodes"),
            (positive_thrust_nodes, "trim.special_case.positive_thrust_nodes"),
            (negative_thrust_nodes, "trim.special_case.negative_thrust_nodes"),
        ] {
            if let Some(&n) = nodes.iter().find(|&&n| n >= num_nodes) {
                return Err(missing(n, context));
            }
        }
    }
    Ok(())
}
