//! Case generators.

use std::f64::consts::FRAC_PI_2;

use crate::schema::{
    AeroDef, AeroNodeDef, AirfoilDef, CaseDef, ControlSurfaceDef, CouplingDef, ElementDef,
    ExhaustionPolicyDef, FlightConditionDef, GridDef, NodeDef, PostProcessorDef,
    StructuralSolverDef, StructureDef,
};
use crate::validate::CASE_VERSION;

/// Symmetric straight wing clamped at the root.
///
/// The right semispan is surface 0 along +y, the left semispan surface 1
/// along -y. Both start from the shared root node 0 and are built from
/// three-node elements.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularWing {
    pub name: String,
    pub semispan_m: f64,
    pub chord_m: f64,
    pub elements_per_side: usize,
    pub chordwise_panels: usize,
    pub elastic_axis: f64,
    /// Nose-up twist of every section. The left semispan stores it negated,
    /// since twist acts after its section frame is turned into the free stream.
    pub twist_deg: f64,
    /// Lumped mass on every non-root node.
    pub node_mass_kg: f64,
    pub airfoil: AirfoilDef,
    /// Trailing-edge flap over the whole span, as a panel count.
    pub flap_chord_panels: Option<usize>,
    pub u_inf_mps: f64,
    pub alpha_deg: f64,
    pub exhaustion_policy: ExhaustionPolicyDef,
}

impl Default for RectangularWing {
    fn default() -> Self {
        Self {
            name: "rectangular wing".to_string(),
            semispan_m: 5.0,
            chord_m: 1.0,
            elements_per_side: 4,
            chordwise_panels: 4,
            elastic_axis: 0.25,
            twist_deg: 0.0,
            node_mass_kg: 0.5,
            airfoil: AirfoilDef::Flat,
            flap_chord_panels: None,
            u_inf_mps: 10.0,
            alpha_deg: 2.0,
            exhaustion_policy: ExhaustionPolicyDef::Warn,
        }
    }
}

impl RectangularWing {
    pub fn num_nodes(&self) -> usize {
        1 + 4 * self.elements_per_side
    }

    pub fn build(&self) -> CaseDef {
        let n = self.elements_per_side;
        let de = self.semispan_m / n as f64;

        let mut nodes = vec![NodeDef {
            pos_m: [0.0; 3],
            boundary: 1,
            mass_kg: 0.0,
        }];
        let mut elements = Vec::with_capacity(2 * n);
        for (side, surface, psi_z) in [(1.0, 0, FRAC_PI_2), (-1.0, 1, -FRAC_PI_2)] {
            let mut start = 0;
            for e in 0..n {
                let y0 = side * de * e as f64;
                let mid = nodes.len();
                nodes.push(NodeDef {
                    pos_m: [0.0, y0 + 0.5 * side * de, 0.0],
                    boundary: 0,
                    mass_kg: self.node_mass_kg,
                });
                let end = nodes.len();
                nodes.push(NodeDef {
                    pos_m: [0.0, y0 + side * de, 0.0],
                    boundary: if e + 1 == n { -1 } else { 0 },
                    mass_kg: self.node_mass_kg,
                });
                elements.push(ElementDef {
                    nodes: vec![start, end, mid],
                    ordering: None,
                    psi: [0.0, 0.0, psi_z],
                    surface: Some(surface),
                });
                start = end;
            }
        }

        let control_surfaces = self
            .flap_chord_panels
            .map(|chord_panels| ControlSurfaceDef {
                chord_panels,
                deflection_deg: 0.0,
            })
            .into_iter()
            .collect::<Vec<_>>();
        let section = AeroNodeDef {
            aero: true,
            chord_m: self.chord_m,
            twist_deg: self.twist_deg,
            elastic_axis: self.elastic_axis,
            airfoil: 0,
            control_surface: self.flap_chord_panels.map(|_| 0),
        };

        CaseDef {
            version: CASE_VERSION,
            name: self.name.clone(),
            aero: AeroDef {
                nodes: (0..nodes.len())
                    .map(|i| AeroNodeDef {
                        twist_deg: if i > 2 * n {
                            -self.twist_deg
                        } else {
                            self.twist_deg
                        },
                        ..section.clone()
                    })
                    .collect(),
                surface_m: vec![self.chordwise_panels; 2],
                distribution: "uniform".to_string(),
                airfoils: vec![self.airfoil.clone()],
                control_surfaces,
                grid: GridDef::default(),
            },
            structure: StructureDef { nodes, elements },
            flight: FlightConditionDef {
                rho_kgpm3: 1.225,
                u_inf_mps: self.u_inf_mps,
                u_inf_direction: [1.0, 0.0, 0.0],
                alpha_deg: self.alpha_deg,
                beta_deg: 0.0,
                roll_deg: 0.0,
            },
            coupling: CouplingDef::new(self.exhaustion_policy),
            structural_solver: StructuralSolverDef::default(),
            aero_solver: Default::default(),
            postprocessors: vec![PostProcessorDef::AeroForcesCalculator {
                text_file: None,
                screen_output: false,
            }],
            forcing: None,
            trim: None,
        }
    }
}
