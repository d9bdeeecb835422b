use std::path::PathBuf;

use polars::prelude::DataFrame;

use cohort_match::{BalanceReport, PropensityModel};
use cohort_model::Group;

use crate::manifest::CohortCounts;

#[derive(Debug)]
pub struct RunResult {
    pub workbook_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub sheets: Vec<SheetSummary>,
    pub counts: CohortCounts,
    pub model: PropensityModel,
    pub balance_prematch: BalanceReport,
    pub balance_postmatch: BalanceReport,
    pub reports: Vec<ReportSummary>,
    /// Dose-response table, kept for the terminal preview.
    pub dose_response: DataFrame,
    /// Files written, empty on a dry run.
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SheetSummary {
    pub group: Group,
    pub sheet: String,
    pub path: PathBuf,
    pub rows: usize,
    pub harmonized: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub file_name: &'static str,
    pub rows: usize,
    pub sha256: String,
}
