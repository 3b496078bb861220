//! Mode-shape post-processing.

use nalgebra::DVector;

use crate::dof::dof_offsets;
use crate::error::{StructureError, StructureResult};
use crate::model::BeamModel;
use crate::timestep::StructuralTimeStep;

/// Scale a mode shape for display.
///
/// The largest nodal rotation is brought to `max_rotation_deg`, unless the
/// largest translation would then exceed `max_displacement` times the largest
/// nodal distance from the origin, in which case translation governs.
/// Vectors longer than the DOF count (state-space form) are scaled as a
/// whole but only the leading DOFs are scanned.
pub fn scale_mode_shape(
    model: &BeamModel,
    step: &StructuralTimeStep,
    mode: &DVector<f64>,
    max_rotation_deg: f64,
    max_displacement: f64,
) -> StructureResult<DVector<f64>> {
    let (offsets, num_dof) = dof_offsets(model.node_dofs());
    if mode.len() < num_dof {
        return Err(StructureError::SizeMismatch {
            what: "mode shape",
            expected: num_dof,
            actual: mode.len(),
        });
    }

    let mut rot_max = 0.0_f64;
    let mut pos_max = 0.0_f64;
    let mut disp_max = 0.0_f64;
    for (node, offset) in offsets.iter().enumerate() {
        let Some(jj) = *offset else { continue };
        let tra = mode.rows(jj, 3);
        let rot = mode.rows(jj + 3, 3);
        rot_max = rot.iter().fold(rot_max, |acc, v| acc.max(v.abs()));
        pos_max = pos_max.max(step.pos[node].norm());
        disp_max = disp_max.max(tra.norm());
    }

    let rot_max_deg = rot_max.to_degrees();
    let translation_factor = || {
        if disp_max > 0.0 {
            Ok(max_displacement * pos_max / disp_max)
        } else {
            Err(StructureError::Configuration {
                what: "mode shape has no deformable content".to_string(),
            })
        }
    };

    let factor = if rot_max_deg > 1e-4 {
        let by_rotation = max_rotation_deg / rot_max_deg;
        if disp_max * by_rotation > max_displacement * pos_max {
            translation_factor()?
        } else {
            by_rotation
        }
    } else {
        translation_factor()?
    };

    Ok(mode * factor)
}
