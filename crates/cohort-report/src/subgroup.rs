//! Subgroup comparison of six-month AST change.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::{Deserialize, Serialize};

use cohort_model::{CombinedRecord, Comorbidity, Group};

use crate::error::{ReportError, Result};
use crate::rank_sum::{RankSumTest, wilcoxon_rank_sum};
use crate::stats::Summary;

/// Record filter defining a subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubgroupFilter {
    Male,
    MinAge { years: f64 },
    Comorbidity { flag: Comorbidity },
}

impl SubgroupFilter {
    pub fn includes(&self, record: &CombinedRecord) -> bool {
        match *self {
            SubgroupFilter::Male => record.sex_bin == 1,
            SubgroupFilter::MinAge { years } => record.age >= years,
            SubgroupFilter::Comorbidity { flag } => {
                record.record.comorbidities.get(flag) == Some(true)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgroup {
    pub name: String,
    pub filter: SubgroupFilter,
}

impl Subgroup {
    pub fn new(name: impl Into<String>, filter: SubgroupFilter) -> Self {
        Self {
            name: name.into(),
            filter,
        }
    }
}

/// Male, Age>=50, Portal HTN, Autoimmune, Hypercoagulable.
pub fn default_subgroups() -> Vec<Subgroup> {
    vec![
        Subgroup::new("Male", SubgroupFilter::Male),
        Subgroup::new("Age>=50", SubgroupFilter::MinAge { years: 50.0 }),
        Subgroup::new(
            "Portal HTN",
            SubgroupFilter::Comorbidity {
                flag: Comorbidity::PortalHtn,
            },
        ),
        Subgroup::new(
            "Autoimmune",
            SubgroupFilter::Comorbidity {
                flag: Comorbidity::Autoimmune,
            },
        ),
        Subgroup::new(
            "Hypercoagulable",
            SubgroupFilter::Comorbidity {
                flag: Comorbidity::Hypercoag,
            },
        ),
    ]
}

/// Which cohort snapshot a comparison was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreMatch,
    PostMatch,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::PreMatch => "pre",
            Phase::PostMatch => "post",
        }
    }
}

/// One subgroup x phase comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgroupComparison {
    pub subgroup: String,
    pub phase: Phase,
    pub treatment: Summary,
    pub control: Summary,
    pub test: Option<RankSumTest>,
}

fn delta_ast(records: &[&CombinedRecord], group: Group) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.group() == group)
        .filter_map(|r| r.record.derived.delta_ast_6)
        .filter(|v| v.is_finite())
        .collect()
}

/// Compares delta AST at six months between arms within one subgroup.
pub fn compare_subgroup(
    subgroup: &Subgroup,
    phase: Phase,
    records: &[&CombinedRecord],
) -> SubgroupComparison {
    let members: Vec<&CombinedRecord> = records
        .iter()
        .copied()
        .filter(|r| subgroup.filter.includes(r))
        .collect();
    let treatment = delta_ast(&members, Group::Treatment);
    let control = delta_ast(&members, Group::Control);

    SubgroupComparison {
        subgroup: subgroup.name.clone(),
        phase,
        treatment: Summary::from_values(treatment.iter().copied().map(Some)),
        control: Summary::from_values(control.iter().copied().map(Some)),
        test: wilcoxon_rank_sum(&treatment, &control),
    }
}

/// Every subgroup on the pre-match then the post-match cohort.
pub fn subgroup_comparisons(
    subgroups: &[Subgroup],
    pre_match: &[&CombinedRecord],
    post_match: &[&CombinedRecord],
) -> Vec<SubgroupComparison> {
    let mut comparisons = Vec::with_capacity(subgroups.len() * 2);
    for subgroup in subgroups {
        comparisons.push(compare_subgroup(subgroup, Phase::PreMatch, pre_match));
        comparisons.push(compare_subgroup(subgroup, Phase::PostMatch, post_match));
    }
    comparisons
}

fn summary_columns(
    prefix: &str,
    comparisons: &[SubgroupComparison],
    pick: fn(&SubgroupComparison) -> &Summary,
) -> Vec<Column> {
    vec![
        Series::new(
            format!("{prefix}_n").into(),
            comparisons
                .iter()
                .map(|c| pick(c).n as u32)
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            format!("{prefix}_median").into(),
            comparisons.iter().map(|c| pick(c).median).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            format!("{prefix}_q25").into(),
            comparisons.iter().map(|c| pick(c).q25).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            format!("{prefix}_q75").into(),
            comparisons.iter().map(|c| pick(c).q75).collect::<Vec<_>>(),
        )
        .into_column(),
    ]
}

fn treatment_summary(comparison: &SubgroupComparison) -> &Summary {
    &comparison.treatment
}

fn control_summary(comparison: &SubgroupComparison) -> &Summary {
    &comparison.control
}

pub fn subgroup_table(comparisons: &[SubgroupComparison]) -> Result<DataFrame> {
    let mut columns = vec![
        Series::new(
            "subgroup".into(),
            comparisons
                .iter()
                .map(|c| c.subgroup.clone())
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "cohort".into(),
            comparisons
                .iter()
                .map(|c| c.phase.as_str())
                .collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    columns.extend(summary_columns("treatment", comparisons, treatment_summary));
    columns.extend(summary_columns("control", comparisons, control_summary));
    columns.push(
        Series::new(
            "p_value".into(),
            comparisons
                .iter()
                .map(|c| c.test.and_then(|t| t.p_value))
                .collect::<Vec<_>>(),
        )
        .into_column(),
    );
    columns.push(
        Series::new(
            "test".into(),
            comparisons
                .iter()
                .map(|c| c.test.map(|t| t.method.as_str()))
                .collect::<Vec<_>>(),
        )
        .into_column(),
    );

    DataFrame::new(columns).map_err(|source| ReportError::Frame {
        report: "subgroup",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_model::PatientRecord;

    fn record(group: Group, age: f64, sex_bin: u8, delta: Option<f64>) -> CombinedRecord {
        let mut patient = PatientRecord::new(group, 1, "1");
        patient.derived.delta_ast_6 = delta;
        CombinedRecord {
            record: patient,
            age,
            sex_bin,
        }
    }

    #[test]
    fn test_filters() {
        let older_male = record(Group::Treatment, 60.0, 1, None);
        let younger_female = record(Group::Treatment, 49.9, 0, None);
        assert!(SubgroupFilter::Male.includes(&older_male));
        assert!(!SubgroupFilter::Male.includes(&younger_female));
        let age = SubgroupFilter::MinAge { years: 50.0 };
        assert!(age.includes(&older_male));
        assert!(!age.includes(&younger_female));
    }

    #[test]
    fn test_empty_subgroup_reports_zero_counts() {
        let records = [record(Group::Treatment, 40.0, 0, Some(5.0))];
        let refs: Vec<&CombinedRecord> = records.iter().collect();
        let comparison = compare_subgroup(
            &Subgroup::new("Male", SubgroupFilter::Male),
            Phase::PreMatch,
            &refs,
        );
        assert_eq!(comparison.treatment.n, 0);
        assert_eq!(comparison.control.n, 0);
        assert_eq!(comparison.treatment.median, None);
        assert_eq!(comparison.test, None);
    }

    #[test]
    fn test_filter_serde_shape() {
        let filter: SubgroupFilter =
            serde_json::from_str(r#"{"kind":"comorbidity","flag":"portal_htn"}"#).unwrap();
        assert_eq!(
            filter,
            SubgroupFilter::Comorbidity {
                flag: Comorbidity::PortalHtn
            }
        );
    }
}
