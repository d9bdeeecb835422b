//! Logistic propensity model fitted by iteratively reweighted least squares.
//!
//! Model:
//! `P(group = TREATMENT) = sigmoid(b0 + b_age * age + b_sex * sex_bin)`
//!
//! Deviance: `2 * sum_i log(1 + exp(eta_i)) - y_i * eta_i`

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cohort_model::{CombinedCohort, CombinedRecord, Group};

use crate::error::ModelFitError;
use crate::math::{log1pexp, sigmoid};

/// Intercept, age, sex.
const PARAMETERS: usize = 3;

/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// IRLS stopping rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Relative deviance change that counts as converged.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 25,
        }
    }
}

/// Fitted propensity model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropensityModel {
    /// `[intercept, age, sex_bin]`.
    pub coefficients: [f64; PARAMETERS],
    pub iterations: usize,
    pub deviance: f64,
}

impl PropensityModel {
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    pub fn age_coefficient(&self) -> f64 {
        self.coefficients[1]
    }

    pub fn sex_coefficient(&self) -> f64 {
        self.coefficients[2]
    }

    pub fn linear_predictor(&self, age: f64, sex_bin: u8) -> f64 {
        let [b0, b_age, b_sex] = self.coefficients;
        b0 + b_age * age + b_sex * f64::from(sex_bin)
    }

    /// Probability of treatment for one set of covariates.
    pub fn score(&self, age: f64, sex_bin: u8) -> f64 {
        sigmoid(self.linear_predictor(age, sex_bin))
    }

    pub fn score_record(&self, record: &CombinedRecord) -> f64 {
        self.score(record.age, record.sex_bin)
    }

    /// Scores in cohort order.
    pub fn scores(&self, cohort: &CombinedCohort) -> Vec<f64> {
        cohort.records.iter().map(|r| self.score_record(r)).collect()
    }
}

fn design_matrix(cohort: &CombinedCohort) -> DMatrix<f64> {
    DMatrix::from_fn(cohort.len(), PARAMETERS, |i, j| {
        let record = &cohort.records[i];
        match j {
            0 => 1.0,
            1 => record.age,
            _ => f64::from(record.sex_bin),
        }
    })
}

fn response(cohort: &CombinedCohort) -> DVector<f64> {
    DVector::from_iterator(
        cohort.len(),
        cohort
            .records
            .iter()
            .map(|r| f64::from(r.group().indicator())),
    )
}

fn matrix_rank(x: &DMatrix<f64>) -> usize {
    let singular = x.clone().svd(false, false).singular_values;
    let max = singular.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 0;
    }
    singular.iter().filter(|&&s| s > RANK_TOLERANCE * max).count()
}

fn deviance(eta: &DVector<f64>, y: &DVector<f64>) -> f64 {
    2.0 * eta
        .iter()
        .zip(y.iter())
        .map(|(&e, &yi)| log1pexp(e) - yi * e)
        .sum::<f64>()
}

/// Fits `P(TREATMENT | age, sex_bin)` over the combined cohort.
///
/// Starts from all-zero coefficients and takes Newton steps until the
/// relative deviance change `|dev - dev_prev| / (|dev| + 0.1)` drops below
/// the tolerance.
pub fn fit_propensity(
    cohort: &CombinedCohort,
    options: &FitOptions,
) -> Result<PropensityModel, ModelFitError> {
    for group in Group::ALL {
        if cohort.count(group) == 0 {
            return Err(ModelFitError::EmptyGroup { group });
        }
    }

    let x = design_matrix(cohort);
    let y = response(cohort);
    let rows = x.nrows();
    let rank = if rows < PARAMETERS { rows } else { matrix_rank(&x) };
    if rank < PARAMETERS {
        return Err(ModelFitError::RankDeficient {
            rank,
            parameters: PARAMETERS,
            rows,
        });
    }

    let mut beta = DVector::<f64>::zeros(PARAMETERS);
    let mut previous = deviance(&(&x * &beta), &y);

    for iteration in 1..=options.max_iterations {
        let eta = &x * &beta;
        let mu = eta.map(sigmoid);
        let weights = mu.map(|m| m * (1.0 - m));

        // X' W X and the score vector X' (y - mu).
        let weighted = DMatrix::from_fn(rows, PARAMETERS, |i, j| x[(i, j)] * weights[i]);
        let information = x.transpose() * weighted;
        let gradient = x.transpose() * (&y - &mu);

        let step = information
            .cholesky()
            .map(|chol| chol.solve(&gradient))
            .ok_or(ModelFitError::Singular { iteration })?;
        beta += step;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ModelFitError::NonFinite { iteration });
        }

        let current = deviance(&(&x * &beta), &y);
        debug!(iteration, deviance = current, "irls step");
        if (current - previous).abs() / (current.abs() + 0.1) < options.tolerance {
            let model = PropensityModel {
                coefficients: [beta[0], beta[1], beta[2]],
                iterations: iteration,
                deviance: current,
            };
            let saturated = cohort.records.iter().any(|r| {
                let p = model.score_record(r);
                p < 1e-8 || p > 1.0 - 1e-8
            });
            if saturated {
                warn!("fitted propensity scores of 0 or 1 occurred");
            }
            return Ok(model);
        }
        previous = current;
    }

    Err(ModelFitError::NotConverged {
        iterations: options.max_iterations,
        deviance: previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cohort_model::PatientRecord;

    fn record(group: Group, row: usize, age: f64, sex_bin: u8) -> CombinedRecord {
        CombinedRecord {
            record: PatientRecord::new(group, row, row.to_string()),
            age,
            sex_bin,
        }
    }

    #[test]
    fn test_score_uses_coefficients() {
        let model = PropensityModel {
            coefficients: [-1.0, 0.02, 0.5],
            iterations: 4,
            deviance: 10.0,
        };
        assert_relative_eq!(model.linear_predictor(50.0, 1), 0.5);
        assert_relative_eq!(model.score(50.0, 0), 0.5);
    }

    #[test]
    fn test_matrix_rank_detects_constant_column() {
        let cohort = CombinedCohort {
            records: vec![
                record(Group::Treatment, 1, 40.0, 1),
                record(Group::Treatment, 2, 50.0, 1),
                record(Group::Control, 1, 60.0, 1),
                record(Group::Control, 2, 70.0, 1),
            ],
            dropped: 0,
        };
        assert_eq!(matrix_rank(&design_matrix(&cohort)), 2);
    }

    #[test]
    fn test_deviance_at_zero_is_n_log_4() {
        let eta = DVector::from_vec(vec![0.0; 4]);
        let y = DVector::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        assert_relative_eq!(deviance(&eta, &y), 4.0 * 2.0 * 2.0_f64.ln(), epsilon = 1e-12);
    }
}
