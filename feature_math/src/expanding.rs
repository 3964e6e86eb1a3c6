//! Expanding (cumulative) statistics
//!
//! Contains:
//! - `ExpandingStats`, a running mean/variance accumulator
//! - `prior_expanding`, the shift-by-one expanding mean/std of a series

use crate::{finite, MeanStd};

/// Running mean and variance over every value seen so far (Welford's method)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandingStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl ExpandingStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value. Non-finite values are skipped, like a missing observation.
    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of values accumulated
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the accumulated values
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        finite(self.mean)
    }

    /// Sample standard deviation (n - 1 denominator)
    pub fn std(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        finite((self.m2 / (self.count - 1) as f64).max(0.0).sqrt())
    }

    /// Current mean and standard deviation as a pair
    pub fn snapshot(&self) -> MeanStd {
        MeanStd {
            mean: self.mean(),
            std: self.std(),
        }
    }
}

/// For each index `i`, the mean/std of `values[..i]`.
///
/// The first entry is always undefined.
pub fn prior_expanding(values: &[f64]) -> Vec<MeanStd> {
    let mut stats = ExpandingStats::new();
    let mut result = Vec::with_capacity(values.len());

    for &value in values {
        result.push(stats.snapshot());
        stats.update(value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_expanding_stats_matches_sample_std() {
        let mut stats = ExpandingStats::new();
        assert_eq!(stats.mean(), None);

        stats.update(2.0);
        assert_eq!(stats.mean(), Some(2.0));
        assert_eq!(stats.std(), None);

        for v in [4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.update(v);
        }

        assert_eq!(stats.count(), 8);
        assert_relative_eq!(stats.mean().unwrap(), 5.0);
        // sum of squared deviations is 32, n - 1 = 7
        assert_relative_eq!(stats.std().unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_nan_is_skipped() {
        let mut stats = ExpandingStats::new();
        stats.update(1.0);
        stats.update(f64::NAN);
        stats.update(3.0);

        assert_eq!(stats.count(), 2);
        assert_relative_eq!(stats.mean().unwrap(), 2.0);
    }

    #[test]
    fn test_prior_expanding_is_shifted() {
        let prior = prior_expanding(&[100.0, 110.0, 120.0]);

        assert_eq!(prior[0], MeanStd::UNDEFINED);
        assert_eq!(prior[1].mean, Some(100.0));
        assert_eq!(prior[1].std, None);
        assert_relative_eq!(prior[2].mean.unwrap(), 105.0);
        assert_relative_eq!(prior[2].std.unwrap(), 50.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_prior_expanding_ignores_current_value() {
        let a = prior_expanding(&[1.0, 2.0, 3.0]);
        let b = prior_expanding(&[1.0, 2.0, 1000.0]);

        assert_eq!(a, b);
    }
}
