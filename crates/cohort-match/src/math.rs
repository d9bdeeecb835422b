//! Numerically stable logistic helpers.

/// Stable `log(1 + exp(x))`.
///
/// `log(1+exp(x)) = max(x,0) + log(1+exp(-|x|))`, so `exp` never overflows.
#[inline]
pub fn log1pexp(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    x.max(0.0) + e.ln_1p()
}

/// Stable sigmoid: `1 / (1 + exp(-x))`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let recip = 1.0 / (1.0 + e);
    if x >= 0.0 { recip } else { e * recip }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log1pexp_matches_naive_moderate_values() {
        for x in [-10.0_f64, -2.0, -0.1, 0.0, 0.1, 2.0, 10.0] {
            assert_relative_eq!(log1pexp(x), (1.0 + x.exp()).ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log1pexp_large_inputs() {
        assert_relative_eq!(log1pexp(800.0), 800.0);
        assert!(log1pexp(-800.0) >= 0.0);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for x in [-30.0_f64, -1.5, 0.0, 0.7, 30.0] {
            assert_relative_eq!(sigmoid(x) + sigmoid(-x), 1.0, epsilon = 1e-15);
        }
        assert_eq!(sigmoid(0.0), 0.5);
    }
}
