//! Per-record listing of the matched cohort.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use cohort_model::MatchedCohort;

use crate::error::{ReportError, Result};

pub fn matched_cohort_table(matched: &MatchedCohort) -> Result<DataFrame> {
    let records = &matched.records;
    DataFrame::new(vec![
        Series::new(
            "pair_id".into(),
            records.iter().map(|r| r.pair_id as u32).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "group".into(),
            records.iter().map(|r| r.group().as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "source_row".into(),
            records
                .iter()
                .map(|r| r.patient().source_row as u32)
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "patient_id".into(),
            records
                .iter()
                .map(|r| r.patient().patient_id.clone())
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "age".into(),
            records.iter().map(|r| r.record.age).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "sex_bin".into(),
            records
                .iter()
                .map(|r| u32::from(r.record.sex_bin))
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "propensity".into(),
            records.iter().map(|r| r.propensity).collect::<Vec<_>>(),
        )
        .into_column(),
    ])
    .map_err(|source| ReportError::Frame {
        report: "matched_cohort",
        source,
    })
}
