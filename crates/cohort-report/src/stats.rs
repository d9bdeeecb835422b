//! Descriptive statistics.
//!
//! Every function ignores missing and non-finite values.

use serde::Serialize;

/// Linear-interpolation quantile of sorted data (Hyndman-Fan type 7).
///
/// Returns `None` for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        len => {
            let pos = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let i = pos.floor() as usize;
            let j = pos.ceil() as usize;
            if i == j {
                return Some(sorted[i]);
            }
            let t = pos - i as f64;
            Some((1.0 - t) * sorted[i] + t * sorted[j])
        }
    }
}

/// Finite values in ascending order.
pub fn sorted_finite<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sorted: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Count, median and interquartile range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub median: Option<f64>,
    pub q25: Option<f64>,
    pub q75: Option<f64>,
}

impl Summary {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let sorted = sorted_finite(values);
        Self {
            n: sorted.len(),
            median: quantile_sorted(&sorted, 0.5),
            q25: quantile_sorted(&sorted, 0.25),
            q75: quantile_sorted(&sorted, 0.75),
        }
    }

    /// `median [q25, q75]` with one decimal, or `None` when empty.
    pub fn median_iqr(&self) -> Option<String> {
        match (self.median, self.q25, self.q75) {
            (Some(median), Some(q25), Some(q75)) => {
                Some(format!("{median:.1} [{q25:.1}, {q75:.1}]"))
            }
            _ => None,
        }
    }
}

/// `n (pct%)` of a denominator, or `None` when the denominator is zero.
pub fn count_percent(count: usize, total: usize) -> Option<String> {
    (total > 0).then(|| format!("{count} ({:.1}%)", 100.0 * count as f64 / total as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_type7() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_sorted(&s, 0.5).unwrap(), 2.5);
        assert_relative_eq!(quantile_sorted(&s, 0.25).unwrap(), 1.75);
        assert_relative_eq!(quantile_sorted(&s, 0.75).unwrap(), 3.25);
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_summary_skips_missing_and_non_finite() {
        let summary = Summary::from_values([Some(3.0), None, Some(f64::NAN), Some(1.0), Some(2.0)]);
        assert_eq!(summary.n, 3);
        assert_eq!(summary.median, Some(2.0));
        assert_eq!(summary.q25, Some(1.5));
        assert_eq!(summary.q75, Some(2.5));
        assert_eq!(summary.median_iqr().as_deref(), Some("2.0 [1.5, 2.5]"));
    }

    #[test]
    fn test_empty_summary_is_null() {
        let summary = Summary::from_values(std::iter::empty());
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.median_iqr(), None);
    }

    #[test]
    fn test_count_percent() {
        assert_eq!(count_percent(2, 3).as_deref(), Some("2 (66.7%)"));
        assert_eq!(count_percent(0, 0), None);
    }
}
