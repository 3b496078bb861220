//! Case loading, saving, validation and introspection.

use std::path::Path;

use fw_project::schema::CaseDef;

use crate::error::{AppError, AppResult};

/// Counts shown by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CaseSummary {
    pub name: String,
    pub node_count: usize,
    pub element_count: usize,
    pub surface_count: usize,
    pub aero_node_count: usize,
    pub control_surface_count: usize,
    pub has_trim: bool,
}

/// Load a case from a YAML file without validating it.
pub fn load_case(path: &Path) -> AppResult<CaseDef> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::CaseFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| AppError::Project(format!("Failed to parse case YAML: {e}")))
}

/// Save a case to a YAML file.
pub fn save_case(path: &Path, case: &CaseDef) -> AppResult<()> {
    let content = serde_yaml::to_string(case)
        .map_err(|e| AppError::Project(format!("Failed to serialize case: {e}")))?;

    std::fs::write(path, content).map_err(|e| AppError::CaseFileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn validate_case(case: &CaseDef) -> AppResult<()> {
    fw_project::validate_case(case)?;
    Ok(())
}

pub fn summarize(case: &CaseDef) -> CaseSummary {
    CaseSummary {
        name: case.name.clone(),
        node_count: case.structure.nodes.len(),
        element_count: case.structure.elements.len(),
        surface_count: case.aero.surface_m.len(),
        aero_node_count: case.aero.nodes.iter().filter(|n| n.aero).count(),
        control_surface_count: case.aero.control_surfaces.len(),
        has_trim: case.trim.is_some(),
    }
}
