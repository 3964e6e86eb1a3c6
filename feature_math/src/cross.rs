//! Differences and ratios between a lagged value and a reference mean

/// Added to every ratio denominator so a zero mean never divides by zero
pub const RATIO_EPSILON: f64 = 1e-6;

/// `lag - mean`, undefined if either side is
pub fn diff(lag: Option<f64>, mean: Option<f64>) -> Option<f64> {
    Some(lag? - mean?)
}

/// `lag / (mean + RATIO_EPSILON)`, undefined if either side is
pub fn safe_ratio(lag: Option<f64>, mean: Option<f64>) -> Option<f64> {
    let ratio = lag? / (mean? + RATIO_EPSILON);
    ratio.is_finite().then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ratio_with_zero_mean() {
        let ratio = safe_ratio(Some(120.0), Some(0.0)).unwrap();
        assert_relative_eq!(ratio, 120.0 / 1e-6);
    }

    #[test]
    fn test_undefined_inputs_propagate() {
        assert_eq!(diff(None, Some(1.0)), None);
        assert_eq!(diff(Some(1.0), None), None);
        assert_eq!(safe_ratio(None, Some(1.0)), None);
        assert_eq!(diff(Some(5.0), Some(2.0)), Some(3.0));
    }

    #[test]
    fn test_ratio_at_negative_epsilon_is_undefined() {
        assert_eq!(safe_ratio(Some(1.0), Some(-RATIO_EPSILON)), None);
    }
}
