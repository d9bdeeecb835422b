//! Run manifest written next to the reports.
//!
//! Holds digests of every input and output plus the fitted model, so two
//! runs can be compared by manifest alone. Paths are recorded by file name
//! only and nothing time-dependent is stored.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use cohort_match::PropensityModel;
use cohort_model::Group;
use cohort_report::RenderedReport;

use crate::types::SheetSummary;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Lowercase hex SHA-256 of `data`.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub tool_version: &'static str,
    pub inputs: Vec<InputEntry>,
    pub cohort: CohortCounts,
    pub model: ModelEntry,
    pub balance: BalanceEntry,
    pub outputs: Vec<OutputEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputEntry {
    pub group: Group,
    pub sheet: String,
    pub file: String,
    pub mapping_version: u32,
    pub rows: usize,
    pub sha256: String,
}

impl InputEntry {
    pub fn new(sheet: &SheetSummary, mapping_version: u32, sha256: String) -> Self {
        Self {
            group: sheet.group,
            sheet: sheet.sheet.clone(),
            file: file_name(&sheet.path),
            mapping_version,
            rows: sheet.rows,
            sha256,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CohortCounts {
    pub treatment: usize,
    pub control: usize,
    /// Rows without a numeric patient identifier.
    pub skipped: usize,
    /// Rows without age or sex.
    pub dropped: usize,
    pub pairs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelEntry {
    pub intercept: f64,
    pub age: f64,
    pub sex: f64,
    pub iterations: usize,
    pub deviance: f64,
}

impl From<&PropensityModel> for ModelEntry {
    fn from(model: &PropensityModel) -> Self {
        Self {
            intercept: model.intercept(),
            age: model.age_coefficient(),
            sex: model.sex_coefficient(),
            iterations: model.iterations,
            deviance: model.deviance,
        }
    }
}

/// Largest absolute standardized difference before and after matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BalanceEntry {
    pub max_abs_smd_prematch: Option<f64>,
    pub max_abs_smd_postmatch: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

impl From<&RenderedReport> for OutputEntry {
    fn from(report: &RenderedReport) -> Self {
        Self {
            file: report.file_name.to_string(),
            rows: report.rows,
            sha256: compute_sha256(&report.bytes),
        }
    }
}

impl Manifest {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_sha256() {
        assert_eq!(
            compute_sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_output_entry_from_report() {
        let report = RenderedReport {
            file_name: "dose_response.csv",
            rows: 0,
            bytes: b"abc".to_vec(),
        };
        let entry = OutputEntry::from(&report);
        assert_eq!(entry.file, "dose_response.csv");
        assert_eq!(entry.sha256, compute_sha256(b"abc"));
    }

    #[test]
    fn test_input_entry_keeps_file_name_only() {
        let sheet = SheetSummary {
            group: Group::Control,
            sheet: "control".to_string(),
            path: Path::new("/data/study/Control.csv").to_path_buf(),
            rows: 5,
            harmonized: 5,
            skipped: 0,
        };
        let entry = InputEntry::new(&sheet, 1, compute_sha256(b""));
        assert_eq!(entry.file, "Control.csv");
        assert_eq!(entry.rows, 5);
    }
}
