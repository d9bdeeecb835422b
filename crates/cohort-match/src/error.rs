use thiserror::Error;

use cohort_model::Group;

/// Failures of the propensity fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelFitError {
    #[error("cannot fit propensity model: no {group} records")]
    EmptyGroup { group: Group },

    #[error("design matrix is rank deficient (rank {rank} of {parameters}, {rows} rows)")]
    RankDeficient {
        rank: usize,
        parameters: usize,
        rows: usize,
    },

    #[error("weighted normal equations are singular at iteration {iteration}")]
    Singular { iteration: usize },

    #[error("propensity fit did not converge in {iterations} iterations (deviance {deviance})")]
    NotConverged { iterations: usize, deviance: f64 },

    #[error("propensity coefficients became non-finite at iteration {iteration}")]
    NonFinite { iteration: usize },
}

/// Failures of the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("insufficient data for matching: {treatment} treatment and {control} control records")]
    InsufficientData { treatment: usize, control: usize },

    #[error("expected {expected} propensity scores, got {actual}")]
    ScoreCount { expected: usize, actual: usize },
}
