//! Baseline characteristics table.
//!
//! One row per characteristic with a formatted TREATMENT and CONTROL cell
//! and, where defined, the standardized mean difference.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use cohort_match::{BalanceReport, assess_balance};
use cohort_model::{CombinedRecord, Comorbidity, Enzyme, Group, Race, Timepoint};

use crate::error::{ReportError, Result};
use crate::stats::{Summary, count_percent};

struct Row {
    characteristic: String,
    treatment: Option<String>,
    control: Option<String>,
    smd: Option<f64>,
}

fn by_group<'a>(records: &[&'a CombinedRecord], group: Group) -> Vec<&'a CombinedRecord> {
    records.iter().copied().filter(|r| r.group() == group).collect()
}

fn cells<F>(arms: &[Vec<&CombinedRecord>; 2], cell: F) -> (Option<String>, Option<String>)
where
    F: Fn(&[&CombinedRecord]) -> Option<String>,
{
    (cell(arms[0].as_slice()), cell(arms[1].as_slice()))
}

fn smd(balance: &BalanceReport, covariate: &str) -> Option<f64> {
    balance
        .get(covariate)
        .and_then(|m| m.standardized_difference)
}

/// Builds the baseline table for one cohort snapshot.
pub fn baseline_table(records: &[&CombinedRecord]) -> Result<DataFrame> {
    let arms = [
        by_group(records, Group::Treatment),
        by_group(records, Group::Control),
    ];
    let balance = assess_balance(records.iter().copied());
    let mut rows = Vec::new();

    let (treatment, control) = cells(&arms, |arm| Some(arm.len().to_string()));
    rows.push(Row {
        characteristic: "N".to_string(),
        treatment,
        control,
        smd: None,
    });

    let (treatment, control) = cells(&arms, |arm| {
        Summary::from_values(arm.iter().map(|r| Some(r.age))).median_iqr()
    });
    rows.push(Row {
        characteristic: "Age, median [IQR]".to_string(),
        treatment,
        control,
        smd: smd(&balance, "age"),
    });

    let (treatment, control) = cells(&arms, |arm| {
        count_percent(arm.iter().filter(|r| r.sex_bin == 1).count(), arm.len())
    });
    rows.push(Row {
        characteristic: "Male, n (%)".to_string(),
        treatment,
        control,
        smd: smd(&balance, "male"),
    });

    for race in Race::ALL {
        let (treatment, control) = cells(&arms, |arm| {
            count_percent(
                arm.iter().filter(|r| r.record.race == race).count(),
                arm.len(),
            )
        });
        rows.push(Row {
            characteristic: format!("Race: {}, n (%)", race.as_str()),
            treatment,
            control,
            smd: None,
        });
    }

    for flag in Comorbidity::ALL {
        let (treatment, control) = cells(&arms, |arm| {
            let recorded: Vec<bool> = arm
                .iter()
                .filter_map(|r| r.record.comorbidities.get(flag))
                .collect();
            count_percent(recorded.iter().filter(|&&v| v).count(), recorded.len())
        });
        rows.push(Row {
            characteristic: format!("{}, n (%)", flag.label()),
            treatment,
            control,
            smd: smd(&balance, flag.key()),
        });
    }

    for enzyme in Enzyme::ALL {
        let (treatment, control) = cells(&arms, |arm| {
            Summary::from_values(
                arm.iter()
                    .map(|r| r.record.labs.get(enzyme, Timepoint::Baseline)),
            )
            .median_iqr()
        });
        rows.push(Row {
            characteristic: format!("{} baseline, median [IQR]", enzyme.label()),
            treatment,
            control,
            smd: None,
        });
    }

    DataFrame::new(vec![
        Series::new(
            "characteristic".into(),
            rows.iter().map(|r| r.characteristic.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "treatment".into(),
            rows.iter().map(|r| r.treatment.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "control".into(),
            rows.iter().map(|r| r.control.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "smd".into(),
            rows.iter().map(|r| r.smd).collect::<Vec<_>>(),
        )
        .into_column(),
    ])
    .map_err(|source| ReportError::Frame {
        report: "baseline",
        source,
    })
}
