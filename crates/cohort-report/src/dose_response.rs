//! Dose-response summary over treated records.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use cohort_model::{CombinedRecord, DoseCategory, Group};

use crate::error::{ReportError, Result};
use crate::stats::Summary;

/// Average days per month used to express intervals in months.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// One row per dose category, in fixed order, over TREATMENT records whose
/// sheet records a dose.
pub fn dose_response_table(records: &[&CombinedRecord]) -> Result<DataFrame> {
    let treated: Vec<&CombinedRecord> = records
        .iter()
        .copied()
        .filter(|r| r.group() == Group::Treatment && r.record.dose_category.is_some())
        .collect();

    let mut labels = Vec::new();
    let mut counts = Vec::new();
    let mut median_mgkg = Vec::new();
    let mut median_days = Vec::new();
    let mut median_months = Vec::new();
    let mut pct_ast = Vec::new();

    for category in DoseCategory::ALL {
        let members: Vec<&CombinedRecord> = treated
            .iter()
            .copied()
            .filter(|r| r.record.dose_category == Some(category))
            .collect();
        let mgkg = Summary::from_values(members.iter().map(|r| r.record.mgkg));
        let days = Summary::from_values(members.iter().map(|r| r.record.interval_days));
        let pct = Summary::from_values(members.iter().map(|r| r.record.derived.pct_ast_6));

        labels.push(category.label());
        counts.push(members.len() as u32);
        median_mgkg.push(mgkg.median);
        median_days.push(days.median);
        median_months.push(days.median.map(|d| d / DAYS_PER_MONTH));
        pct_ast.push(pct.median_iqr());
    }

    DataFrame::new(vec![
        Series::new("dose_category".into(), labels).into_column(),
        Series::new("n".into(), counts).into_column(),
        Series::new("median_mgkg".into(), median_mgkg).into_column(),
        Series::new("median_interval_days".into(), median_days).into_column(),
        Series::new("median_interval_months".into(), median_months).into_column(),
        Series::new("pct_ast_6_median_iqr".into(), pct_ast).into_column(),
    ])
    .map_err(|source| ReportError::Frame {
        report: "dose_response",
        source,
    })
}
