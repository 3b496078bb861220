//! Lifting-surface grid generation from the deformed beam.
//!
//! Each aerodynamic span station produces one chordwise strip of `M + 1`
//! points. The strip is built in the cross-section frame `B` (x spanwise,
//! y towards the leading edge, z up), deflected, optionally turned into the
//! free stream, twisted, then rotated and translated into the body frame `A`.

use fw_core::ensure_all_finite;
use fw_structure::StructuralTimeStep;
use fw_structure::rotation::{crv2rot, in_plane_angle, rotation_x, rotation_z};
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;
use tracing::trace;

use crate::airfoil::Airfoil;
use crate::error::AeroResult;
use crate::input::ChordwiseDistribution;
use crate::model::AeroModel;
use crate::timestep::AeroTimeStepInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Turn every strip so its chord follows the free stream.
    pub aligned_grid: bool,
    /// Free-stream direction in the body frame.
    pub freestream_dir: Vector3<f64>,
    /// Wake panels per span station.
    pub mstar: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            aligned_grid: true,
            freestream_dir: Vector3::x(),
            mstar: 10,
        }
    }
}

/// Trailing-edge flap state of one strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flap {
    pub chord_panels: usize,
    pub deflection: f64,
}

/// Cross-section geometry of one strip.
#[derive(Debug, Clone, Copy)]
pub struct StripSection<'a> {
    pub chord: f64,
    pub twist: f64,
    pub elastic_axis: f64,
    pub airfoil: &'a Airfoil,
    pub flap: Option<Flap>,
}

fn chordwise_stations(m: usize, distribution: ChordwiseDistribution) -> Vec<f64> {
    match distribution {
        ChordwiseDistribution::Uniform => (0..=m).map(|i| i as f64 / m as f64).collect(),
    }
}

/// Chordwise strip of `m + 1` points in the body frame, leading edge first.
pub fn generate_strip(
    section: &StripSection<'_>,
    m: usize,
    distribution: ChordwiseDistribution,
    node_pos: &Vector3<f64>,
    psi: &Vector3<f64>,
    settings: &GridSettings,
) -> Vec<Vector3<f64>> {
    let mut points: Vec<Vector3<f64>> = chordwise_stations(m, distribution)
        .into_iter()
        .map(|x| {
            Vector3::new(
                0.0,
                -(x - section.elastic_axis) * section.chord,
                section.airfoil.camber(x) * section.chord,
            )
        })
        .collect();

    if let Some(flap) = section.flap.filter(|f| f.chord_panels > 0 && f.chord_panels <= m) {
        let hinge_index = m - flap.chord_panels;
        let hinge = points[hinge_index];
        let rot = rotation_x(flap.deflection);
        for p in points.iter_mut().skip(hinge_index + 1) {
            *p = hinge + rot * (*p - hinge);
        }
    }

    // alignment about local z comes before twist about the chord line
    let cab = crv2rot(psi);
    if settings.aligned_grid {
        let local = rotation_z(FRAC_PI_2) * settings.freestream_dir;
        let mut new_x = cab.transpose() * local;
        new_x.z = 0.0;
        let angle = in_plane_angle(&settings.freestream_dir, &new_x);
        let align = rotation_z(angle);
        points.iter_mut().for_each(|p| *p = align * *p);
    }

    let twist = rotation_x(section.twist);
    points.iter_mut().for_each(|p| *p = twist * *p);

    points.into_iter().map(|p| node_pos + cab * p).collect()
}

impl AeroModel {
    /// Regenerate the bound grid of every surface from the structural state.
    ///
    /// The first wake row is re-attached to the new trailing edge; the rest
    /// of the wake is left to the aerodynamic solver.
    pub fn update_grid(
        &self,
        structure: &StructuralTimeStep,
        aero: &mut AeroTimeStepInfo,
    ) -> AeroResult<()> {
        for (s, surface) in aero.surfaces.iter_mut().enumerate() {
            let m = surface.m;
            let strips = self.mapping().strips(fw_core::SurfId::from_usize(s));
            for (j, src) in strips.iter().enumerate() {
                let attrs = &self.input().nodes[src.node.idx()];
                let flap = attrs.control_surface.map(|cs| Flap {
                    chord_panels: self.input().control_surfaces[cs].chord_panels,
                    deflection: aero.control_surface_deflection[cs],
                });
                let section = StripSection {
                    chord: attrs.chord,
                    twist: attrs.twist,
                    elastic_axis: attrs.elastic_axis,
                    airfoil: &self.input().airfoils[attrs.airfoil],
                    flap,
                };
                let strip = generate_strip(
                    &section,
                    m,
                    self.input().distribution,
                    &structure.pos[src.node.idx()],
                    &structure.psi[src.elem.idx()][src.local],
                    self.settings(),
                );
                for (i, p) in strip.into_iter().enumerate() {
                    surface.zeta.set(i, j, p);
                }
                surface.zeta_star.set(0, j, surface.zeta.get(m, j));
            }
            for p in surface.zeta.iter() {
                ensure_all_finite(p.as_slice(), "aerodynamic grid")?;
            }
            trace!(surface = s, m, n = surface.n, "grid regenerated");
        }
        Ok(())
    }

    /// Fresh aerodynamic snapshot with the grid generated and the wake laid
    /// out downstream of the trailing edge.
    pub fn initial_step(&self, structure: &StructuralTimeStep) -> AeroResult<AeroTimeStepInfo> {
        let mut aero = AeroTimeStepInfo::new(
            &self.dimensions(),
            self.settings().mstar,
            self.input().control_surfaces.len(),
        );
        for (d, cs) in aero
            .control_surface_deflection
            .iter_mut()
            .zip(&self.input().control_surfaces)
        {
            *d = cs.deflection;
        }
        self.update_grid(structure, &mut aero)?;
        let dir = self.settings().freestream_dir.normalize();
        for surface in &mut aero.surfaces {
            let m = surface.m;
            for j in 0..=surface.n {
                let te = surface.zeta.get(m, j);
                let dx = (te - surface.zeta.get(m - 1, j)).norm();
                for i in 0..=surface.mstar() {
                    surface.zeta_star.set(i, j, te + dir * (dx * i as f64));
                }
            }
        }
        Ok(aero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn flat_section(airfoil: &Airfoil) -> StripSection<'_> {
        StripSection {
            chord: 2.0,
            twist: 0.0,
            elastic_axis: 0.25,
            airfoil,
            flap: None,
        }
    }

    fn right_psi() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, FRAC_PI_2)
    }

    #[test]
    fn leading_edge_is_upstream_of_elastic_axis() {
        let airfoil = Airfoil::flat();
        let strip = generate_strip(
            &flat_section(&airfoil),
            4,
            ChordwiseDistribution::Uniform,
            &Vector3::new(0.0, 3.0, 0.0),
            &right_psi(),
            &GridSettings::default(),
        );
        assert_eq!(strip.len(), 5);
        assert!((strip[0] - Vector3::new(-0.5, 3.0, 0.0)).norm() < 1e-12);
        assert!((strip[4] - Vector3::new(1.5, 3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn left_wing_aligns_with_freestream() {
        let airfoil = Airfoil::flat();
        let strip = generate_strip(
            &flat_section(&airfoil),
            4,
            ChordwiseDistribution::Uniform,
            &Vector3::new(0.0, -3.0, 0.0),
            &Vector3::new(0.0, 0.0, -FRAC_PI_2),
            &GridSettings::default(),
        );
        assert!((strip[0] - Vector3::new(-0.5, -3.0, 0.0)).norm() < 1e-12);
        assert!((strip[4] - Vector3::new(1.5, -3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn swept_strip_stays_streamwise() {
        let airfoil = Airfoil::flat();
        let sweep = 30.0_f64.to_radians();
        let strip = generate_strip(
            &flat_section(&airfoil),
            2,
            ChordwiseDistribution::Uniform,
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, FRAC_PI_2 - sweep),
            &GridSettings::default(),
        );
        let chord = strip[2] - strip[0];
        assert!(chord.y.abs() < 1e-12);
        assert!((chord.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn swept_twisted_strip_aligns_before_twisting() {
        let airfoil = Airfoil::flat();
        let section = StripSection {
            twist: 0.2,
            ..flat_section(&airfoil)
        };
        let psi = Vector3::new(0.0, 0.0, PI / 3.0);
        let strip = generate_strip(
            &section,
            2,
            ChordwiseDistribution::Uniform,
            &Vector3::zeros(),
            &psi,
            &GridSettings::default(),
        );
        // 60 deg of sweep leaves 30 deg between the local chord and the free stream
        let te_b = Vector3::new(0.0, -1.5, 0.0);
        let expected = rotation_z(PI / 3.0) * rotation_x(0.2) * rotation_z(PI / 6.0) * te_b;
        assert!((strip[2] - expected).norm() < 1e-12);
        assert!((strip[2] - Vector3::new(1.4776, 0.0129, -0.2581)).norm() < 1e-3);
    }

    #[test]
    fn twist_acts_in_the_aligned_section_frame() {
        let airfoil = Airfoil::flat();
        let mut section = flat_section(&airfoil);
        section.twist = 0.1;
        // the left frame is turned by pi about z, so the same twist pitches it nose-down
        for (psi, le_up) in [(right_psi(), true), (Vector3::new(0.0, 0.0, -FRAC_PI_2), false)] {
            let strip = generate_strip(
                &section,
                4,
                ChordwiseDistribution::Uniform,
                &Vector3::zeros(),
                &psi,
                &GridSettings::default(),
            );
            assert_eq!(strip[0].z > 0.0, le_up);
            assert_eq!(strip[4].z < 0.0, le_up);
        }
    }

    #[test]
    fn flap_deflects_only_aft_points() {
        let airfoil = Airfoil::flat();
        let mut section = flat_section(&airfoil);
        section.flap = Some(Flap {
            chord_panels: 1,
            deflection: 0.2,
        });
        let strip = generate_strip(
            &section,
            4,
            ChordwiseDistribution::Uniform,
            &Vector3::zeros(),
            &right_psi(),
            &GridSettings::default(),
        );
        assert!(strip[..4].iter().all(|p| p.z.abs() < 1e-12));
        assert!(strip[4].z < 0.0);
        let hinge_to_te = (strip[4] - strip[3]).norm();
        assert!((hinge_to_te - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unaligned_grid_follows_section_frame() {
        let airfoil = Airfoil::flat();
        let settings = GridSettings {
            aligned_grid: false,
            ..GridSettings::default()
        };
        let strip = generate_strip(
            &flat_section(&airfoil),
            2,
            ChordwiseDistribution::Uniform,
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, PI / 3.0),
            &settings,
        );
        let chord_dir = (strip[2] - strip[0]).normalize();
        let y_b = crv2rot(&Vector3::new(0.0, 0.0, PI / 3.0)) * Vector3::y();
        assert!((chord_dir + y_b).norm() < 1e-12);
    }
}
