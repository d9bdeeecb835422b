//! Greedy 1:1 nearest-neighbor matching without replacement.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cohort_model::{CombinedCohort, Group, MatchedCohort, MatchedRecord};

use crate::error::MatchError;

/// Order in which treated records pick their control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    /// Highest propensity first.
    #[default]
    Largest,
    /// Lowest propensity first.
    Smallest,
    /// Sheet order.
    Data,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub order: MatchOrder,
}

/// Treated cohort indices in processing order. Sorts are stable, so equal
/// scores keep cohort order.
fn processing_order(treated: &[usize], scores: &[f64], order: MatchOrder) -> Vec<usize> {
    let mut ordered = treated.to_vec();
    match order {
        MatchOrder::Largest => ordered.sort_by(|&a, &b| scores[b].total_cmp(&scores[a])),
        MatchOrder::Smallest => ordered.sort_by(|&a, &b| scores[a].total_cmp(&scores[b])),
        MatchOrder::Data => {}
    }
    ordered
}

/// Position in `available` of the closest control; ties go to the first,
/// which is the lowest cohort index.
fn nearest(available: &[usize], scores: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (position, &index) in available.iter().enumerate() {
        let distance = (scores[index] - target).abs();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((position, distance));
        }
    }
    best.map(|(position, _)| position)
}

/// Matches each treated record to its nearest available control.
///
/// `scores` holds one propensity per cohort record, in cohort order.
/// Matching stops once either pool is exhausted; unmatched records are
/// dropped.
pub fn match_nearest(
    cohort: &CombinedCohort,
    scores: &[f64],
    options: &MatchOptions,
) -> Result<MatchedCohort, MatchError> {
    if scores.len() != cohort.len() {
        return Err(MatchError::ScoreCount {
            expected: cohort.len(),
            actual: scores.len(),
        });
    }

    let indices_of = |group: Group| -> Vec<usize> {
        cohort
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.group() == group)
            .map(|(i, _)| i)
            .collect()
    };
    let treated = indices_of(Group::Treatment);
    let mut available = indices_of(Group::Control);
    if treated.is_empty() || available.is_empty() {
        return Err(MatchError::InsufficientData {
            treatment: treated.len(),
            control: available.len(),
        });
    }

    let mut records = Vec::with_capacity(2 * treated.len().min(available.len()));
    for t in processing_order(&treated, scores, options.order) {
        let Some(position) = nearest(&available, scores, scores[t]) else {
            break;
        };
        let c = available.remove(position);
        let pair_id = records.len() / 2 + 1;
        debug!(pair_id, distance = (scores[t] - scores[c]).abs(), "pair matched");
        for index in [t, c] {
            records.push(MatchedRecord {
                record: cohort.records[index].clone(),
                propensity: scores[index],
                pair_id,
            });
        }
    }

    let matched = MatchedCohort { records };
    info!(
        pairs = matched.pair_count(),
        unmatched_treatment = treated.len() - matched.pair_count(),
        unmatched_control = available.len(),
        "matching complete"
    );
    Ok(matched)
}
