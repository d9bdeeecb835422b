//! Report tables for a matched two-arm cohort.
//!
//! Every report is built as a polars [`DataFrame`] and rendered to CSV bytes
//! in memory. Files are only written by [`write_reports`], after the whole
//! set rendered successfully, so a failure never leaves a partial set.
//!
//! | File | Cohort |
//! |------|--------|
//! | `baseline_prematch.csv` | unified |
//! | `baseline_postmatch.csv` | matched |
//! | `temporal_labs.csv` | unified |
//! | `subgroup_comparison.csv` | unified and matched |
//! | `dose_response.csv` | unified, treatment arm |
//! | `matched_cohort.csv` | matched |

mod baseline;
mod dose_response;
mod error;
mod frame;
mod matched;
mod rank_sum;
mod stats;
mod subgroup;
mod temporal;

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{debug, info};

use cohort_model::{CombinedCohort, CombinedRecord, MatchedCohort};

// === Error Types ===
pub use error::{ReportError, Result};

// === Report Builders ===
pub use baseline::baseline_table;
pub use dose_response::{DAYS_PER_MONTH, dose_response_table};
pub use matched::matched_cohort_table;
pub use subgroup::{
    Phase, Subgroup, SubgroupComparison, SubgroupFilter, compare_subgroup, default_subgroups,
    subgroup_comparisons, subgroup_table,
};
pub use temporal::temporal_table;

// === Statistics ===
pub use rank_sum::{RankSumMethod, RankSumTest, wilcoxon_rank_sum};
pub use stats::{Summary, count_percent, quantile_sorted};

// === Rendering ===
pub use frame::{FLOAT_PRECISION, any_to_string, render_csv};

pub const BASELINE_PREMATCH_FILE: &str = "baseline_prematch.csv";
pub const BASELINE_POSTMATCH_FILE: &str = "baseline_postmatch.csv";
pub const TEMPORAL_FILE: &str = "temporal_labs.csv";
pub const SUBGROUP_FILE: &str = "subgroup_comparison.csv";
pub const DOSE_RESPONSE_FILE: &str = "dose_response.csv";
pub const MATCHED_COHORT_FILE: &str = "matched_cohort.csv";

/// All report tables of one run.
#[derive(Debug, Clone)]
pub struct ReportSet {
    pub baseline_prematch: DataFrame,
    pub baseline_postmatch: DataFrame,
    pub temporal: DataFrame,
    pub subgroups: DataFrame,
    pub dose_response: DataFrame,
    pub matched_cohort: DataFrame,
}

/// A report rendered to bytes, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: &'static str,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Builds every report from the unified and matched cohorts.
pub fn build_reports(
    cohort: &CombinedCohort,
    matched: &MatchedCohort,
    subgroups: &[Subgroup],
) -> Result<ReportSet> {
    let pre_match: Vec<&CombinedRecord> = cohort.records.iter().collect();
    let post_match: Vec<&CombinedRecord> = matched.records.iter().map(|m| &m.record).collect();

    let comparisons = subgroup_comparisons(subgroups, &pre_match, &post_match);
    let set = ReportSet {
        baseline_prematch: baseline_table(&pre_match)?,
        baseline_postmatch: baseline_table(&post_match)?,
        temporal: temporal_table(&pre_match)?,
        subgroups: subgroup_table(&comparisons)?,
        dose_response: dose_response_table(&pre_match)?,
        matched_cohort: matched_cohort_table(matched)?,
    };
    debug!(
        subgroups = subgroups.len(),
        comparisons = comparisons.len(),
        "reports built"
    );
    Ok(set)
}

impl ReportSet {
    /// `(file name, frame)` in output order.
    pub fn tables(&self) -> [(&'static str, &DataFrame); 6] {
        [
            (BASELINE_PREMATCH_FILE, &self.baseline_prematch),
            (BASELINE_POSTMATCH_FILE, &self.baseline_postmatch),
            (TEMPORAL_FILE, &self.temporal),
            (SUBGROUP_FILE, &self.subgroups),
            (DOSE_RESPONSE_FILE, &self.dose_response),
            (MATCHED_COHORT_FILE, &self.matched_cohort),
        ]
    }

    /// Renders every table to CSV bytes.
    pub fn render(&self) -> Result<Vec<RenderedReport>> {
        self.tables()
            .into_iter()
            .map(|(file_name, frame)| {
                let mut frame = frame.clone();
                let bytes = render_csv(&mut frame, file_name)?;
                Ok(RenderedReport {
                    file_name,
                    rows: frame.height(),
                    bytes,
                })
            })
            .collect()
    }
}

/// Writes rendered reports into `dir`, creating it if needed.
pub fn write_reports(dir: &Path, reports: &[RenderedReport]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = dir.join(report.file_name);
        fs::write(&path, &report.bytes).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), rows = report.rows, "report written");
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "reports written");
    Ok(written)
}
