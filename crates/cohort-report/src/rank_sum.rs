//! Two-sided Wilcoxon rank-sum (Mann-Whitney) test.
//!
//! The statistic is `W = R_x - m(m+1)/2`, where `R_x` is the rank sum of the
//! first sample. Small samples without ties use the exact null distribution;
//! everything else uses the normal approximation with continuity and tie
//! correction.

use std::f64::consts::SQRT_2;

use serde::Serialize;
use statrs::function::erf::erfc;

/// Both samples must be smaller than this for the exact distribution.
pub const EXACT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSumMethod {
    Exact,
    Normal,
}

impl RankSumMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RankSumMethod::Exact => "exact",
            RankSumMethod::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankSumTest {
    pub statistic: f64,
    /// `None` when every value is tied.
    pub p_value: Option<f64>,
    pub method: RankSumMethod,
}

/// Midranks of the pooled sample, plus tie group sizes.
fn midranks(pooled: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&a, &b| pooled[a].total_cmp(&pooled[b]));

    let mut ranks = vec![0.0; pooled.len()];
    let mut ties = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && pooled[order[end]] == pooled[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1 ..= end share their mean
        let rank = (start + 1 + end) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        ties.push(end - start);
        start = end;
    }
    (ranks, ties)
}

/// `P(W <= q)` under the null for sample sizes `m` and `n`.
///
/// Counts subsets of `m` ranks out of `1..=m+n` by their sum.
fn exact_cdf(q: f64, m: usize, n: usize) -> f64 {
    let total_ranks = m + n;
    let max_sum = (total_ranks * (total_ranks + 1)) / 2;
    // ways[j][s]: subsets of size j with rank sum s
    let mut ways = vec![vec![0.0_f64; max_sum + 1]; m + 1];
    ways[0][0] = 1.0;
    for rank in 1..=total_ranks {
        for j in (1..=m.min(rank)).rev() {
            for s in (rank..=max_sum).rev() {
                let add = ways[j - 1][s - rank];
                if add != 0.0 {
                    ways[j][s] += add;
                }
            }
        }
    }

    let offset = m * (m + 1) / 2;
    let total: f64 = ways[m].iter().sum();
    let below: f64 = ways[m]
        .iter()
        .enumerate()
        .filter(|(s, _)| (*s as f64 - offset as f64) <= q + 1e-7)
        .map(|(_, w)| w)
        .sum();
    below / total
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Tests whether `x` and `y` come from the same distribution.
///
/// Missing and non-finite values are dropped first. Returns `None` when
/// either sample is then empty.
pub fn wilcoxon_rank_sum(x: &[f64], y: &[f64]) -> Option<RankSumTest> {
    let x: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    let y: Vec<f64> = y.iter().copied().filter(|v| v.is_finite()).collect();
    let (m, n) = (x.len(), y.len());
    if m == 0 || n == 0 {
        return None;
    }

    let pooled: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    let (ranks, ties) = midranks(&pooled);
    let rank_sum_x: f64 = ranks[..m].iter().sum();
    let statistic = rank_sum_x - (m * (m + 1)) as f64 / 2.0;
    let has_ties = ties.iter().any(|&t| t > 1);
    let (mf, nf) = (m as f64, n as f64);

    if m < EXACT_LIMIT && n < EXACT_LIMIT && !has_ties {
        let p = if statistic > mf * nf / 2.0 {
            1.0 - exact_cdf(statistic - 1.0, m, n)
        } else {
            exact_cdf(statistic, m, n)
        };
        return Some(RankSumTest {
            statistic,
            p_value: Some((2.0 * p).min(1.0)),
            method: RankSumMethod::Exact,
        });
    }

    let total = mf + nf;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = mf * nf / 12.0 * ((total + 1.0) - tie_term / (total * (total - 1.0)));
    let centered = statistic - mf * nf / 2.0;
    let p_value = (variance > 0.0).then(|| {
        let correction = if centered == 0.0 {
            0.0
        } else {
            0.5 * centered.signum()
        };
        let z = (centered - correction) / variance.sqrt();
        let tail = standard_normal_cdf(z).min(standard_normal_cdf(-z));
        (2.0 * tail).min(1.0)
    });
    Some(RankSumTest {
        statistic,
        p_value,
        method: RankSumMethod::Normal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_separated_samples() {
        let test = wilcoxon_rank_sum(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0, 7.0]).unwrap();
        assert_eq!(test.method, RankSumMethod::Exact);
        assert_eq!(test.statistic, 0.0);
        assert_relative_eq!(test.p_value.unwrap(), 2.0 / 35.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_is_symmetric() {
        let forward = wilcoxon_rank_sum(&[4.0, 5.0, 6.0, 7.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(forward.statistic, 12.0);
        assert_relative_eq!(forward.p_value.unwrap(), 2.0 / 35.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_interleaved_is_one() {
        // W = 2 of a possible 0..=4, the center of the distribution
        let test = wilcoxon_rank_sum(&[1.0, 4.0], &[2.0, 3.0]).unwrap();
        assert_eq!(test.statistic, 2.0);
        assert_relative_eq!(test.p_value.unwrap(), 1.0);
    }

    #[test]
    fn test_ties_use_normal_approximation() {
        let test = wilcoxon_rank_sum(&[1.0, 2.0, 2.0, 3.0], &[2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(test.method, RankSumMethod::Normal);
        assert_eq!(test.statistic, 2.5);
        assert_relative_eq!(test.p_value.unwrap(), 0.136_658, epsilon = 1e-5);
    }

    #[test]
    fn test_all_tied_has_no_p_value() {
        let test = wilcoxon_rank_sum(&[1.0, 1.0], &[1.0, 1.0]).unwrap();
        assert_eq!(test.p_value, None);
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(wilcoxon_rank_sum(&[], &[1.0]), None);
        assert_eq!(wilcoxon_rank_sum(&[f64::NAN], &[1.0]), None);
    }

    #[test]
    fn test_midranks() {
        let (ranks, ties) = midranks(&[3.0, 1.0, 3.0, 2.0]);
        assert_eq!(ranks, vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(ties, vec![1, 1, 2]);
    }
}
