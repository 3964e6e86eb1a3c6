//! Trailing window statistics and positional lags
//!
//! Two window flavours are provided:
//! - full windows (`RollingWindow`, `prior_rolling`), defined only once the
//!   window holds `period` values
//! - tail windows (`tail_mean`, `tail_std`), which use whatever is available
//!   up to `period` values

use crate::{finite, MathError, MeanStd, Result};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Fixed-length trailing window with a running sum
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// Create a new window holding at most `period` values
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a value, evicting the oldest once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        // a NaN poisons the running sum until it leaves the window
        if !self.sum.is_finite() {
            self.sum = self.values.iter().sum();
        }
    }

    /// Whether the window holds `period` values
    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    /// Mean of a full window
    pub fn full_mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        finite(self.sum / self.period as f64)
    }

    /// Sample standard deviation of a full window
    pub fn full_std(&self) -> Option<f64> {
        if !self.is_full() || self.period < 2 {
            return None;
        }
        finite(self.values.iter().std_dev())
    }
}

/// For each index `i`, mean/std of the `period` values immediately before `i`.
///
/// Entries without a complete window of prior values are undefined.
pub fn prior_rolling(values: &[f64], period: usize) -> Result<Vec<MeanStd>> {
    let mut window = RollingWindow::new(period)?;
    let mut result = Vec::with_capacity(values.len());

    for &value in values {
        result.push(MeanStd {
            mean: window.full_mean(),
            std: window.full_std(),
        });
        window.update(value);
    }

    Ok(result)
}

/// Mean of the last `min(period, len)` values
pub fn tail_mean(values: &[f64], period: usize) -> Option<f64> {
    let tail = tail(values, period);
    if tail.is_empty() {
        return None;
    }
    finite(tail.iter().mean())
}

/// Sample standard deviation of the last `min(period, len)` values
pub fn tail_std(values: &[f64], period: usize) -> Option<f64> {
    let tail = tail(values, period);
    if tail.len() < 2 {
        return None;
    }
    finite(tail.iter().std_dev())
}

fn tail(values: &[f64], period: usize) -> &[f64] {
    &values[values.len().saturating_sub(period)..]
}

/// Value `n` positions before `index`, if the series reaches back that far
pub fn lag_back(values: &[f64], index: usize, n: usize) -> Option<f64> {
    if n == 0 || index < n || index > values.len() {
        return None;
    }
    finite(values[index - n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn test_rolling_window_requires_full_period() {
        let mut window = RollingWindow::new(3).unwrap();
        window.update(10.0);
        window.update(11.0);
        assert_eq!(window.full_mean(), None);

        window.update(9.0);
        assert_relative_eq!(window.full_mean().unwrap(), 10.0);
        assert_relative_eq!(window.full_std().unwrap(), 1.0);

        window.update(13.0);
        assert!(window.is_full());
        assert_relative_eq!(window.full_mean().unwrap(), 11.0);
    }

    #[test]
    fn test_window_recovers_once_nan_leaves() {
        let mut window = RollingWindow::new(2).unwrap();
        window.update(1.0);
        window.update(f64::NAN);
        assert_eq!(window.full_mean(), None);

        window.update(3.0);
        assert_eq!(window.full_mean(), None);

        window.update(5.0);
        assert_relative_eq!(window.full_mean().unwrap(), 4.0);
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(matches!(
            RollingWindow::new(0),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_prior_rolling_is_shifted() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let prior = prior_rolling(&values, 2).unwrap();

        assert_eq!(prior[0].mean, None);
        assert_eq!(prior[1].mean, None);
        assert_relative_eq!(prior[2].mean.unwrap(), 1.5);
        assert_relative_eq!(prior[4].mean.unwrap(), 3.5);
    }

    #[test]
    fn test_prior_rolling_does_not_see_the_future() {
        let mut rng = StdRng::seed_from_u64(7);
        let base: Vec<f64> = (0..80).map(|_| rng.gen_range(0.0..500.0)).collect();

        for period in [7, 30, 60] {
            let short = prior_rolling(&base[..50], period).unwrap();
            let long = prior_rolling(&base, period).unwrap();
            assert_eq!(short[..], long[..50]);
        }
    }

    #[rstest]
    #[case(&[100.0, 110.0, 120.0], 7, Some(110.0))]
    #[case(&[1.0, 2.0, 3.0, 4.0], 2, Some(3.5))]
    #[case(&[], 7, None)]
    fn test_tail_mean(#[case] values: &[f64], #[case] period: usize, #[case] expected: Option<f64>) {
        assert_eq!(tail_mean(values, period), expected);
    }

    #[test]
    fn test_tail_std_needs_two_points() {
        assert_eq!(tail_std(&[5.0], 7), None);
        assert_relative_eq!(tail_std(&[100.0, 110.0, 120.0], 7).unwrap(), 10.0);
    }

    #[rstest]
    #[case(3, 1, Some(3.0))]
    #[case(3, 3, Some(1.0))]
    #[case(3, 4, None)]
    #[case(0, 1, None)]
    fn test_lag_back(#[case] index: usize, #[case] n: usize, #[case] expected: Option<f64>) {
        assert_eq!(lag_back(&[1.0, 2.0, 3.0, 4.0], index, n), expected);
    }
}
