//! Cross features: each lag slot against each scope mean

use crate::features::{CrossFeatures, Lag, Scope};
use feature_math::{diff, safe_ratio};

/// Undefined cross features, indexed `[lag][scope]`
pub type CrossValues = [[Option<f64>; 3]; 3];

/// `slot - mean` and `slot / (mean + ε)` for every (lag slot, scope) pair.
///
/// `slots` is indexed by [`Lag`], `means` by [`Scope`].
pub fn derive(slots: [Option<f64>; 3], means: [Option<f64>; 3]) -> (CrossValues, CrossValues) {
    let mut diffs = [[None; 3]; 3];
    let mut ratios = [[None; 3]; 3];

    for lag in Lag::ALL {
        for scope in Scope::ALL {
            let slot = slots[lag.index()];
            let mean = means[scope.index()];
            diffs[lag.index()][scope.index()] = diff(slot, mean);
            ratios[lag.index()][scope.index()] = safe_ratio(slot, mean);
        }
    }

    (diffs, ratios)
}

/// Resolve undefined diffs and ratios to fixed fallback values
pub fn fill(
    (diffs, ratios): (CrossValues, CrossValues),
    diff_fallback: f64,
    ratio_fallback: f64,
) -> CrossFeatures {
    CrossFeatures {
        diff: diffs.map(|row| row.map(|v| v.unwrap_or(diff_fallback))),
        ratio: ratios.map(|row| row.map(|v| v.unwrap_or(ratio_fallback))),
    }
}
