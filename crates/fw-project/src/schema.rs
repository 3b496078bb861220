//! Case file schema.
//!
//! Angles are in degrees on disk; the runtime works in radians.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub version: u32,
    pub name: String,
    pub structure: StructureDef,
    pub aero: AeroDef,
    pub flight: FlightConditionDef,
    pub coupling: CouplingDef,
    #[serde(default)]
    pub structural_solver: StructuralSolverDef,
    #[serde(default)]
    pub aero_solver: AeroSolverDef,
    #[serde(default)]
    pub postprocessors: Vec<PostProcessorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forcing: Option<ForcingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructureDef {
    pub nodes: Vec<NodeDef>,
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub pos_m: [f64; 3],
    /// Boundary code: -1 free end, 0 free, 1 clamped, 2 driven.
    #[serde(default)]
    pub boundary: i8,
    #[serde(default)]
    pub mass_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    /// Node indices; three-node elements list `[end_a, end_b, mid]`.
    pub nodes: Vec<usize>,
    /// Natural ordering; defaults to the standard order for the node count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Vec<usize>>,
    /// Cartesian rotation vector of the cross-section frame.
    pub psi: [f64; 3],
    /// Aerodynamic surface driven by this element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AeroDef {
    /// One entry per structural node.
    pub nodes: Vec<AeroNodeDef>,
    /// Chordwise panel count per surface.
    pub surface_m: Vec<usize>,
    #[serde(default = "default_distribution")]
    pub distribution: String,
    pub airfoils: Vec<AirfoilDef>,
    #[serde(default)]
    pub control_surfaces: Vec<ControlSurfaceDef>,
    #[serde(default)]
    pub grid: GridDef,
}

fn default_distribution() -> String {
    "uniform".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AeroNodeDef {
    #[serde(default = "default_true")]
    pub aero: bool,
    #[serde(default)]
    pub chord_m: f64,
    #[serde(default)]
    pub twist_deg: f64,
    /// Chord fraction from the leading edge.
    #[serde(default)]
    pub elastic_axis: f64,
    #[serde(default)]
    pub airfoil: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_surface: Option<usize>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AirfoilDef {
    Flat,
    Naca {
        /// Maximum camber, chord fraction.
        m: f64,
        /// Position of maximum camber, chord fraction.
        p: f64,
        #[serde(default = "default_naca_points")]
        points: usize,
    },
    Table {
        /// `(x, camber)` pairs sorted by x over [0, 1].
        points: Vec<[f64; 2]>,
    },
}

fn default_naca_points() -> usize {
    21
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlSurfaceDef {
    pub chord_panels: usize,
    #[serde(default)]
    pub deflection_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridDef {
    #[serde(default = "default_true")]
    pub aligned_grid: bool,
    #[serde(default = "default_x")]
    pub freestream_dir: [f64; 3],
    #[serde(default = "default_mstar")]
    pub mstar: usize,
}

impl Default for GridDef {
    fn default() -> Self {
        Self {
            aligned_grid: true,
            freestream_dir: default_x(),
            mstar: default_mstar(),
        }
    }
}

fn default_x() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

fn default_mstar() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightConditionDef {
    #[serde(default = "default_rho")]
    pub rho_kgpm3: f64,
    pub u_inf_mps: f64,
    #[serde(default = "default_x")]
    pub u_inf_direction: [f64; 3],
    #[serde(default)]
    pub alpha_deg: f64,
    #[serde(default)]
    pub beta_deg: f64,
    #[serde(default)]
    pub roll_deg: f64,
}

fn default_rho() -> f64 {
    1.225
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicyDef {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouplingDef {
    #[serde(default = "default_n_time_steps")]
    pub n_time_steps: usize,
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    #[serde(default = "default_fsi_substeps")]
    pub fsi_substeps: usize,
    #[serde(default = "default_fsi_tolerance")]
    pub fsi_tolerance: f64,
    #[serde(default)]
    pub relaxation_factor: f64,
    #[serde(default = "default_final_relaxation")]
    pub final_relaxation_factor: f64,
    #[serde(default = "default_relaxation_steps")]
    pub relaxation_steps: usize,
    #[serde(default = "default_true")]
    pub dynamic_relaxation: bool,
    #[serde(default = "default_minimum_steps")]
    pub minimum_steps: usize,
    #[serde(default = "default_one")]
    pub unsteady_force_coefficient: f64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_cores")]
    pub num_cores: usize,
    /// Required: what to do when the substep budget runs out.
    pub exhaustion_policy: ExhaustionPolicyDef,
}

impl CouplingDef {
    /// Defaults for everything except the exhaustion policy.
    pub fn new(exhaustion_policy: ExhaustionPolicyDef) -> Self {
        Self {
            n_time_steps: default_n_time_steps(),
            dt_s: default_dt(),
            fsi_substeps: default_fsi_substeps(),
            fsi_tolerance: default_fsi_tolerance(),
            relaxation_factor: 0.0,
            final_relaxation_factor: default_final_relaxation(),
            relaxation_steps: default_relaxation_steps(),
            dynamic_relaxation: true,
            minimum_steps: default_minimum_steps(),
            unsteady_force_coefficient: 1.0,
            history_capacity: default_history_capacity(),
            num_cores: default_cores(),
            exhaustion_policy,
        }
    }
}

fn default_n_time_steps() -> usize {
    100
}
fn default_dt() -> f64 {
    0.05
}
fn default_fsi_substeps() -> usize {
    70
}
fn default_fsi_tolerance() -> f64 {
    1e-5
}
fn default_final_relaxation() -> f64 {
    0.7
}
fn default_relaxation_steps() -> usize {
    60
}
fn default_minimum_steps() -> usize {
    3
}
fn default_one() -> f64 {
    1.0
}
fn default_history_capacity() -> usize {
    64
}
fn default_cores() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StructuralSolverDef {
    LinearSpring {
        #[serde(default = "default_kt")]
        translational_stiffness: f64,
        #[serde(default = "default_kr")]
        rotational_stiffness: f64,
        #[serde(default)]
        gravity: bool,
        #[serde(default = "default_gravity_dir")]
        gravity_dir: [f64; 3],
        #[serde(default = "default_g0")]
        gravity_mps2: f64,
    },
}

impl Default for StructuralSolverDef {
    fn default() -> Self {
        StructuralSolverDef::LinearSpring {
            translational_stiffness: default_kt(),
            rotational_stiffness: default_kr(),
            gravity: false,
            gravity_dir: default_gravity_dir(),
            gravity_mps2: default_g0(),
        }
    }
}

fn default_kt() -> f64 {
    1.0e4
}
fn default_kr() -> f64 {
    1.0e3
}
fn default_gravity_dir() -> [f64; 3] {
    [0.0, 0.0, -1.0]
}
fn default_g0() -> f64 {
    9.806_65
}

/// Aerodynamic solver; the flow comes from the flight condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum AeroSolverDef {
    #[default]
    FlatPanel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PostProcessorDef {
    AeroForcesCalculator {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_file: Option<String>,
        #[serde(default)]
        screen_output: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ForcingDef {
    /// Constant loads added to the steady channel, `[fx, fy, fz, mx, my, mz]`.
    #[serde(default)]
    pub static_forces: Vec<NodeLoadDef>,
    /// Entry `t - 1` applies at step `t`.
    #[serde(default)]
    pub steps: Vec<ForcingStepDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeLoadDef {
    pub node: usize,
    pub load: [f64; 6],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ForcingStepDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_vel: Option<[f64; 6]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_acc: Option<[f64; 6]>,
    #[serde(default)]
    pub dynamic_forces: Vec<NodeLoadDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrimDef {
    #[serde(default)]
    pub initial_alpha_deg: f64,
    #[serde(default)]
    pub initial_beta_deg: f64,
    #[serde(default)]
    pub initial_roll_deg: f64,
    #[serde(default)]
    pub cs_indices: Vec<usize>,
    #[serde(default)]
    pub initial_cs_deflection_deg: Vec<f64>,
    #[serde(default)]
    pub thrust_nodes: Vec<usize>,
    #[serde(default)]
    pub initial_thrust_n: Vec<f64>,
    #[serde(default = "default_thrust_direction")]
    pub thrust_direction: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_case: Option<SpecialCaseDef>,
    #[serde(default = "default_trim_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
    #[serde(default)]
    pub refine_solution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence_penalty: Option<f64>,
    #[serde(default)]
    pub output: TrimOutputDef,
}

impl Default for TrimDef {
    fn default() -> Self {
        Self {
            initial_alpha_deg: 0.0,
            initial_beta_deg: 0.0,
            initial_roll_deg: 0.0,
            cs_indices: Vec::new(),
            initial_cs_deflection_deg: Vec::new(),
            thrust_nodes: Vec::new(),
            initial_thrust_n: Vec::new(),
            thrust_direction: default_thrust_direction(),
            special_case: None,
            tolerance: default_trim_tolerance(),
            max_evaluations: default_max_evaluations(),
            refine_solution: false,
            divergence_penalty: None,
            output: TrimOutputDef::default(),
        }
    }
}

/// Residual reported by each trim evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrimOutputDef {
    #[default]
    Weighted,
    Resultants,
    /// One resultant component: 0..3 force, 3..6 moment.
    Component { index: usize },
}

fn default_thrust_direction() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}
fn default_trim_tolerance() -> f64 {
    1e-4
}
fn default_max_evaluations() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SpecialCaseDef {
    DifferentialThrust {
        initial_base_thrust_n: f64,
        #[serde(default)]
        initial_differential_parameter: f64,
        #[serde(default)]
        base_thrust_nodes: Vec<usize>,
        #[serde(default)]
        positive_thrust_nodes: Vec<usize>,
        #[serde(default)]
        negative_thrust_nodes: Vec<usize>,
    },
}
