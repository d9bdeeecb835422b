//! Propensity-score matching.
//!
//! [`fit_propensity`] estimates `P(TREATMENT | age, sex)` over a combined
//! cohort, [`match_nearest`] pairs treated and control records 1:1 on that
//! score, and [`assess_balance`] reports standardized differences before
//! and after matching.

pub mod balance;
pub mod error;
pub mod math;
pub mod matcher;
pub mod propensity;

pub use balance::{
    BalanceMetric, BalanceReport, CovariateKind, IMBALANCE_THRESHOLD, assess_balance,
    standardized_difference,
};
pub use error::{MatchError, ModelFitError};
pub use matcher::{MatchOptions, MatchOrder, match_nearest};
pub use propensity::{FitOptions, PropensityModel, fit_propensity};
