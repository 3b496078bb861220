//! Post-processors run once per committed step.
//!
//! They receive the committed snapshot read-only. A failure is reported to
//! the driver, which logs it and carries on; committed history is untouched.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use nalgebra::Vector3;
use tracing::info;

use crate::error::{CouplingError, CouplingResult};
use crate::history::CouplingSnapshot;

pub trait PostProcessor {
    fn name(&self) -> &'static str;

    fn run(&mut self, step: usize, snapshot: &CouplingSnapshot) -> CouplingResult<()>;
}

/// Aerodynamic force totals of one committed step, summed over surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceRecord {
    pub step: usize,
    pub steady_inertial: Vector3<f64>,
    pub unsteady_inertial: Vector3<f64>,
    pub steady_body: Vector3<f64>,
    pub unsteady_body: Vector3<f64>,
}

impl ForceRecord {
    fn from_snapshot(step: usize, snapshot: &CouplingSnapshot) -> Self {
        let mut r = ForceRecord {
            step,
            steady_inertial: Vector3::zeros(),
            unsteady_inertial: Vector3::zeros(),
            steady_body: Vector3::zeros(),
            unsteady_body: Vector3::zeros(),
        };
        for t in &snapshot.aero.totals {
            r.steady_inertial += t.steady_inertial;
            r.unsteady_inertial += t.unsteady_inertial;
            r.steady_body += t.steady_body;
            r.unsteady_body += t.unsteady_body;
        }
        r
    }

    fn csv_row(&self) -> String {
        let cols = [
            self.steady_inertial,
            self.unsteady_inertial,
            self.steady_body,
            self.unsteady_body,
        ];
        let values: Vec<String> = cols
            .iter()
            .flat_map(|v| v.iter().map(|x| format!("{x:.6e}")).collect::<Vec<_>>())
            .collect();
        format!("{}, {}", self.step, values.join(", "))
    }
}

const FORCES_HEADER: &str = "tstep, fx_steady_G, fy_steady_G, fz_steady_G, \
fx_unsteady_G, fy_unsteady_G, fz_unsteady_G, \
fx_steady_a, fy_steady_a, fz_steady_a, \
fx_unsteady_a, fy_unsteady_a, fz_unsteady_a";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AeroForcesSettings {
    /// Text file receiving one comma-separated row per step.
    pub text_file: Option<PathBuf>,
    pub screen_output: bool,
}

/// Records per-step aerodynamic force totals.
#[derive(Debug, Clone, Default)]
pub struct AeroForcesCalculator {
    settings: AeroForcesSettings,
    records: Vec<ForceRecord>,
    header_written: bool,
}

impl AeroForcesCalculator {
    pub fn new(settings: AeroForcesSettings) -> Self {
        Self {
            settings,
            records: Vec::new(),
            header_written: false,
        }
    }

    pub fn records(&self) -> &[ForceRecord] {
        &self.records
    }

    fn write_row(&mut self, record: &ForceRecord) -> std::io::Result<()> {
        let Some(path) = &self.settings.text_file else {
            return Ok(());
        };
        let file = if self.header_written {
            OpenOptions::new().append(true).open(path)?
        } else {
            File::create(path)?
        };
        let mut w = BufWriter::new(file);
        if !self.header_written {
            writeln!(w, "{FORCES_HEADER}")?;
            self.header_written = true;
        }
        writeln!(w, "{}", record.csv_row())?;
        w.flush()
    }
}

impl PostProcessor for AeroForcesCalculator {
    fn name(&self) -> &'static str {
        "aero forces calculator"
    }

    fn run(&mut self, step: usize, snapshot: &CouplingSnapshot) -> CouplingResult<()> {
        let record = ForceRecord::from_snapshot(step, snapshot);
        if self.settings.screen_output {
            let total = record.steady_inertial + record.unsteady_inertial;
            info!(
                step,
                fx = total.x,
                fy = total.y,
                fz = total.z,
                "aero forces (inertial)"
            );
        }
        self.records.push(record);
        self.write_row(&record)
            .map_err(|e| CouplingError::PostProcessor {
                name: "aero forces calculator",
                message: e.to_string(),
            })
    }
}

#[derive(Debug)]
pub enum PostProcessorKind {
    AeroForcesCalculator(AeroForcesCalculator),
}

impl PostProcessor for PostProcessorKind {
    fn name(&self) -> &'static str {
        match self {
            PostProcessorKind::AeroForcesCalculator(p) => p.name(),
        }
    }

    fn run(&mut self, step: usize, snapshot: &CouplingSnapshot) -> CouplingResult<()> {
        match self {
            PostProcessorKind::AeroForcesCalculator(p) => p.run(step, snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_has_thirteen_columns() {
        let r = ForceRecord {
            step: 3,
            steady_inertial: Vector3::new(1.0, 2.0, 3.0),
            unsteady_inertial: Vector3::zeros(),
            steady_body: Vector3::zeros(),
            unsteady_body: Vector3::zeros(),
        };
        let row = r.csv_row();
        assert_eq!(row.split(", ").count(), 13);
        assert!(row.starts_with("3, 1.000000e0"));
        assert_eq!(FORCES_HEADER.split(", ").count(), 13);
    }
}
