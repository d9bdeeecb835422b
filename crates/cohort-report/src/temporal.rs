//! Longitudinal lab summary.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use cohort_model::{CombinedRecord, Enzyme, Group, Timepoint};

use crate::error::{ReportError, Result};
use crate::stats::Summary;

/// n, median and IQR for every group x enzyme x timepoint cell.
pub fn temporal_table(records: &[&CombinedRecord]) -> Result<DataFrame> {
    let mut groups = Vec::new();
    let mut enzymes = Vec::new();
    let mut months = Vec::new();
    let mut summaries = Vec::new();

    for group in Group::ALL {
        for enzyme in Enzyme::ALL {
            for timepoint in Timepoint::ALL {
                let summary = Summary::from_values(
                    records
                        .iter()
                        .filter(|r| r.group() == group)
                        .map(|r| r.record.labs.get(enzyme, timepoint)),
                );
                groups.push(group.as_str());
                enzymes.push(enzyme.label());
                months.push(timepoint.months());
                summaries.push(summary);
            }
        }
    }

    DataFrame::new(vec![
        Series::new("group".into(), groups).into_column(),
        Series::new("enzyme".into(), enzymes).into_column(),
        Series::new("month".into(), months).into_column(),
        Series::new(
            "n".into(),
            summaries.iter().map(|s| s.n as u32).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "median".into(),
            summaries.iter().map(|s| s.median).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "q25".into(),
            summaries.iter().map(|s| s.q25).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "q75".into(),
            summaries.iter().map(|s| s.q75).collect::<Vec<_>>(),
        )
        .into_column(),
    ])
    .map_err(|source| ReportError::Frame {
        report: "temporal",
        source,
    })
}
