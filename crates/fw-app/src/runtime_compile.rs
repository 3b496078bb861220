//! Runtime compilation of a case into a coupling driver.

use std::path::Path;

use fw_aero::{
    AeroInput, AeroModel, AeroNodeAttrs, Airfoil, ChordwiseDistribution, ControlSurface,
    GridSettings,
};
use fw_core::SurfId;
use fw_core::units::{deg, kgpm3, mps, s};
use fw_coupling::{
    AeroForcesCalculator, AeroForcesSettings, AeroSolverKind, CouplingSettings, ExhaustionPolicy,
    FlatPanelSettings, FlatPanelSolver, LinearSpringSolver, PostProcessorKind, PrescribedForcing,
    PrescribedStep, SpringStructureSettings, StandardDriver, StructuralSolverKind,
};
use fw_project::schema::{
    AeroDef, AeroSolverDef, AirfoilDef, CaseDef, CouplingDef, ExhaustionPolicyDef, ForcingDef,
    NodeLoadDef, PostProcessorDef, SpecialCaseDef, StructuralSolverDef, StructureDef, TrimDef,
    TrimOutputDef,
};
use fw_structure::element::default_ordering;
use fw_structure::rotation::euler2quat;
use fw_structure::{BeamBuilder, BeamModel, BoundaryCode, StructuralTimeStep, Vector6};
use fw_trim::{SpecialCase, TrimOutput, TrimSettings};
use nalgebra::Vector3;
use tracing::info;

use crate::error::{AppError, AppResult};

fn vec3(v: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

fn vec6(v: [f64; 6]) -> Vector6 {
    Vector6::from_row_slice(&v)
}

/// Compile a validated case into a driver ready to run.
///
/// Relative post-processor output paths are resolved against `base_dir`.
pub fn compile_case(case: &CaseDef, base_dir: &Path) -> AppResult<StandardDriver> {
    fw_project::validate_case(case)?;

    let beam = build_beam(&case.structure)?;
    let aero_model = build_aero_model(&beam, &case.structure, &case.aero)?;
    let settings = coupling_settings(&case.coupling);

    let structural = match &case.structural_solver {
        StructuralSolverDef::LinearSpring {
            translational_stiffness,
            rotational_stiffness,
            gravity,
            gravity_dir,
            gravity_mps2,
        } => StructuralSolverKind::LinearSpring(LinearSpringSolver::new(
            SpringStructureSettings {
                translational_stiffness: *translational_stiffness,
                rotational_stiffness: *rotational_stiffness,
                gravity: *gravity,
                gravity_dir: vec3(*gravity_dir).normalize(),
                gravity_accel: *gravity_mps2,
            },
        )?),
    };
    let aero = match case.aero_solver {
        AeroSolverDef::FlatPanel => AeroSolverKind::FlatPanel(FlatPanelSolver::new(
            FlatPanelSettings {
                rho: kgpm3(case.flight.rho_kgpm3).value,
                u_inf: mps(case.flight.u_inf_mps).value,
                u_inf_direction: vec3(case.flight.u_inf_direction).normalize(),
            },
            settings.num_cores,
        )?),
    };

    let mut structure = StructuralTimeStep::initial(&beam);
    structure.quat = euler2quat(
        deg(case.flight.roll_deg).value,
        deg(case.flight.alpha_deg).value,
        deg(case.flight.beta_deg).value,
    );

    let num_nodes = beam.num_nodes();
    let mut driver = StandardDriver::with_initial_state(
        beam,
        aero_model,
        settings,
        structural,
        aero,
        structure,
    )?;
    if let Some(forcing) = &case.forcing {
        driver.set_forcing(build_forcing(forcing, num_nodes)?)?;
    }
    for p in &case.postprocessors {
        driver.add_postprocessor(build_postprocessor(p, base_dir));
    }

    info!(
        case = %case.name,
        nodes = num_nodes,
        surfaces = case.aero.surface_m.len(),
        "case compiled"
    );
    Ok(driver)
}

pub fn build_beam(def: &StructureDef) -> AppResult<BeamModel> {
    let mut builder = BeamBuilder::new();
    let ids: Vec<_> = def
        .nodes
        .iter()
        .map(|n| builder.add_node(vec3(n.pos_m), BoundaryCode(n.boundary)))
        .collect();
    for (id, n) in ids.iter().zip(&def.nodes) {
        builder.set_node_mass(*id, n.mass_kg);
    }
    for el in &def.elements {
        let conn = el
            .nodes
            .iter()
            .map(|&n| {
                ids.get(n).copied().ok_or_else(|| {
                    AppError::Compile(format!("element references missing node {n}"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        let ordering = el
            .ordering
            .clone()
            .unwrap_or_else(|| default_ordering(conn.len()));
        let psi = vec![vec3(el.psi); conn.len()];
        builder.add_element(conn, ordering, psi);
    }
    Ok(builder.build()?)
}

fn build_airfoil(def: &AirfoilDef) -> AppResult<Airfoil> {
    Ok(match def {
        AirfoilDef::Flat => Airfoil::flat(),
        AirfoilDef::Naca { m, p, points } => Airfoil::naca_mean_line(*m, *p, *points)?,
        AirfoilDef::Table { points } => {
            let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p[0], p[1])).collect();
            Airfoil::new(&pairs)?
        }
    })
}

pub fn build_aero_model(
    beam: &BeamModel,
    structure: &StructureDef,
    def: &AeroDef,
) -> AppResult<AeroModel> {
    let nodes = def
        .nodes
        .iter()
        .map(|n| {
            if n.aero {
                AeroNodeAttrs {
                    aero: true,
                    chord: n.chord_m,
                    twist: deg(n.twist_deg).value,
                    elastic_axis: n.elastic_axis,
                    airfoil: n.airfoil,
                    control_surface: n.control_surface,
                }
            } else {
                AeroNodeAttrs::none()
            }
        })
        .collect();
    let input = AeroInput {
        nodes,
        surface_distribution: structure
            .elements
            .iter()
            .map(|e| e.surface.map(SurfId::from_usize))
            .collect(),
        surface_m: def.surface_m.clone(),
        distribution: def.distribution.parse::<ChordwiseDistribution>()?,
        airfoils: def
            .airfoils
            .iter()
            .map(build_airfoil)
            .collect::<AppResult<_>>()?,
        control_surfaces: def
            .control_surfaces
            .iter()
            .map(|cs| ControlSurface {
                chord_panels: cs.chord_panels,
                deflection: deg(cs.deflection_deg).value,
            })
            .collect(),
    };
    let grid = GridSettings {
        aligned_grid: def.grid.aligned_grid,
        freestream_dir: vec3(def.grid.freestream_dir).normalize(),
        mstar: def.grid.mstar,
    };
    Ok(AeroModel::new(beam, input, grid)?)
}

pub fn coupling_settings(def: &CouplingDef) -> CouplingSettings {
    let policy = match def.exhaustion_policy {
        ExhaustionPolicyDef::Warn => ExhaustionPolicy::Warn,
        ExhaustionPolicyDef::Fail => ExhaustionPolicy::Fail,
    };
    CouplingSettings {
        n_time_steps: def.n_time_steps,
        dt: s(def.dt_s).value,
        fsi_substeps: def.fsi_substeps,
        fsi_tolerance: def.fsi_tolerance,
        relaxation_factor: def.relaxation_factor,
        final_relaxation_factor: def.final_relaxation_factor,
        relaxation_steps: def.relaxation_steps,
        dynamic_relaxation: def.dynamic_relaxation,
        minimum_steps: def.minimum_steps,
        unsteady_force_coefficient: def.unsteady_force_coefficient,
        history_capacity: def.history_capacity,
        num_cores: def.num_cores,
        exhaustion_policy: policy,
    }
}

fn node_loads(loads: &[NodeLoadDef], num_nodes: usize) -> Vec<Vector6> {
    let mut out = vec![Vector6::zeros(); num_nodes];
    for l in loads {
        if let Some(slot) = out.get_mut(l.node) {
            *slot += vec6(l.load);
        }
    }
    out
}

pub fn build_forcing(def: &ForcingDef, num_nodes: usize) -> AppResult<PrescribedForcing> {
    let mut forcing = PrescribedForcing::none(num_nodes);
    for (node, load) in node_loads(&def.static_forces, num_nodes)
        .into_iter()
        .enumerate()
    {
        forcing.set_static_force(node, load)?;
    }
    for step in &def.steps {
        forcing.push_step(PrescribedStep {
            for_vel: step.for_vel.map(vec6),
            for_acc: step.for_acc.map(vec6),
            dynamic_forces: (!step.dynamic_forces.is_empty())
                .then(|| node_loads(&step.dynamic_forces, num_nodes)),
        })?;
    }
    Ok(forcing)
}

fn build_postprocessor(def: &PostProcessorDef, base_dir: &Path) -> PostProcessorKind {
    match def {
        PostProcessorDef::AeroForcesCalculator {
            text_file,
            screen_output,
        } => PostProcessorKind::AeroForcesCalculator(AeroForcesCalculator::new(
            AeroForcesSettings {
                text_file: text_file.as_ref().map(|f| base_dir.join(f)),
                screen_output: *screen_output,
            },
        )),
    }
}

/// Runtime trim settings; angles converted to radians.
pub fn trim_settings(def: &TrimDef) -> TrimSettings {
    TrimSettings {
        initial_alpha: deg(def.initial_alpha_deg).value,
        initial_beta: deg(def.initial_beta_deg).value,
        initial_roll: deg(def.initial_roll_deg).value,
        cs_indices: def.cs_indices.clone(),
        initial_cs_deflection: def
            .initial_cs_deflection_deg
            .iter()
            .map(|d| deg(*d).value)
            .collect(),
        thrust_nodes: def.thrust_nodes.clone(),
        initial_thrust: def.initial_thrust_n.clone(),
        thrust_direction: vec3(def.thrust_direction).normalize(),
        special_case: def.special_case.as_ref().map(|sc| match sc {
            SpecialCaseDef::DifferentialThrust {
                initial_base_thrust_n,
                initial_differential_parameter,
                base_thrust_nodes,
                positive_thrust_nodes,
                negative_thrust_nodes,
            } => SpecialCase::DifferentialThrust {
                initial_base_thrust: *initial_base_thrust_n,
                initial_differential_parameter: *initial_differential_parameter,
                base_thrust_nodes: base_thrust_nodes.clone(),
                positive_thrust_nodes: positive_thrust_nodes.clone(),
                negative_thrust_nodes: negative_thrust_nodes.clone(),
            },
        }),
        tolerance: def.tolerance,
        max_evaluations: def.max_evaluations,
        refine_solution: def.refine_solution,
        divergence_penalty: def.divergence_penalty,
        output: match def.output {
            TrimOutputDef::Weighted => TrimOutput::Weighted,
            TrimOutputDef::Resultants => TrimOutput::Resultants,
            TrimOutputDef::Component { index } => TrimOutput::Component(index),
        },
    }
}
