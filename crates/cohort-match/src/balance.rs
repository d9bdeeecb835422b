//! Covariate balance between treatment and control.

use serde::{Deserialize, Serialize};

use cohort_model::{CombinedRecord, Comorbidity, Group};

/// Absolute standardized difference above which a covariate is flagged.
pub const IMBALANCE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovariateKind {
    Continuous,
    Binary,
}

/// Balance of a single covariate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMetric {
    pub covariate: String,
    pub kind: CovariateKind,
    /// Mean (or proportion) among treated records with a value.
    pub treatment_mean: Option<f64>,
    pub control_mean: Option<f64>,
    pub standardized_difference: Option<f64>,
}

impl BalanceMetric {
    pub fn is_imbalanced(&self) -> bool {
        self.standardized_difference
            .is_some_and(|d| d.abs() > IMBALANCE_THRESHOLD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub metrics: Vec<BalanceMetric>,
}

impl BalanceReport {
    pub fn get(&self, covariate: &str) -> Option<&BalanceMetric> {
        self.metrics.iter().find(|m| m.covariate == covariate)
    }

    pub fn imbalanced(&self) -> usize {
        self.metrics.iter().filter(|m| m.is_imbalanced()).count()
    }

    pub fn max_abs_difference(&self) -> Option<f64> {
        self.metrics
            .iter()
            .filter_map(|m| m.standardized_difference)
            .map(f64::abs)
            .reduce(f64::max)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance; zero for a single value.
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

/// `(mean_T - mean_C) / sqrt((var_T + var_C) / 2)`.
///
/// Binary covariates use `p(1 - p)` as the variance. `None` when either
/// side is empty or the pooled deviation is zero.
pub fn standardized_difference(
    treatment: &[f64],
    control: &[f64],
    kind: CovariateKind,
) -> Option<f64> {
    let mean_t = mean(treatment)?;
    let mean_c = mean(control)?;
    let (var_t, var_c) = match kind {
        CovariateKind::Continuous => (
            sample_variance(treatment, mean_t),
            sample_variance(control, mean_c),
        ),
        CovariateKind::Binary => (mean_t * (1.0 - mean_t), mean_c * (1.0 - mean_c)),
    };
    let pooled = ((var_t + var_c) / 2.0).sqrt();
    (pooled > 0.0 && pooled.is_finite()).then(|| (mean_t - mean_c) / pooled)
}

fn metric(
    covariate: &str,
    kind: CovariateKind,
    treatment: &[f64],
    control: &[f64],
) -> BalanceMetric {
    BalanceMetric {
        covariate: covariate.to_string(),
        kind,
        treatment_mean: mean(treatment),
        control_mean: mean(control),
        standardized_difference: standardized_difference(treatment, control, kind),
    }
}

fn split<F>(records: &[&CombinedRecord], value: F) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(&CombinedRecord) -> Option<f64>,
{
    let mut treatment = Vec::new();
    let mut control = Vec::new();
    for &record in records {
        if let Some(v) = value(record).filter(|v| v.is_finite()) {
            match record.group() {
                Group::Treatment => treatment.push(v),
                Group::Control => control.push(v),
            }
        }
    }
    (treatment, control)
}

/// Balance of age, sex and comorbidity flags.
///
/// Comorbidity proportions use records with a recorded flag only.
pub fn assess_balance<'a, I>(records: I) -> BalanceReport
where
    I: IntoIterator<Item = &'a CombinedRecord>,
{
    let records: Vec<&CombinedRecord> = records.into_iter().collect();
    let mut metrics = Vec::with_capacity(2 + Comorbidity::ALL.len());

    let (t, c) = split(&records, |r| Some(r.age));
    metrics.push(metric("age", CovariateKind::Continuous, &t, &c));

    let (t, c) = split(&records, |r| Some(f64::from(r.sex_bin)));
    metrics.push(metric("male", CovariateKind::Binary, &t, &c));

    for flag in Comorbidity::ALL {
        let (t, c) = split(&records, |r| {
            r.record.comorbidities.get(flag).map(f64::from)
        });
        metrics.push(metric(flag.key(), CovariateKind::Binary, &t, &c));
    }

    BalanceReport { metrics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_continuous_difference() {
        // means 2 and 4, variances 1 and 1
        let d = standardized_difference(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0], CovariateKind::Continuous);
        assert_relative_eq!(d.unwrap(), -2.0);
    }

    #[test]
    fn test_binary_difference() {
        // p_T = 0.5, p_C = 0.25
        let d = standardized_difference(
            &[1.0, 0.0, 1.0, 0.0],
            &[1.0, 0.0, 0.0, 0.0],
            CovariateKind::Binary,
        );
        let pooled = ((0.25 + 0.1875) / 2.0_f64).sqrt();
        assert_relative_eq!(d.unwrap(), 0.25 / pooled);
    }

    #[test]
    fn test_degenerate_inputs_are_null() {
        assert_eq!(standardized_difference(&[], &[1.0], CovariateKind::Continuous), None);
        assert_eq!(
            standardized_difference(&[1.0, 1.0], &[1.0, 1.0], CovariateKind::Binary),
            None
        );
        assert_eq!(
            standardized_difference(&[5.0], &[5.0], CovariateKind::Continuous),
            None
        );
    }
}
