//! # Feature Math
//!
//! Window statistics used to build forecasting features without lookahead.
//! Every "prior" helper in this crate only aggregates values strictly before
//! the index it reports for, so a statistic attributed to position `i` never
//! sees `values[i]` or anything after it.
//!
//! Undefined results (no history, a single point for a standard deviation,
//! an incomplete window) are returned as `None`; callers decide the fill.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cross;
pub mod expanding;
pub mod rolling;

pub use cross::{diff, safe_ratio, RATIO_EPSILON};
pub use expanding::{prior_expanding, ExpandingStats};
pub use rolling::{lag_back, prior_rolling, tail_mean, tail_std, RollingWindow};

/// Errors that can occur in feature calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for feature math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Mean and sample standard deviation of some set of prior values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    /// Mean, undefined without any values
    pub mean: Option<f64>,
    /// Sample standard deviation, undefined with fewer than two values
    pub std: Option<f64>,
}

impl MeanStd {
    /// Statistics for an empty set of values
    pub const UNDEFINED: MeanStd = MeanStd {
        mean: None,
        std: None,
    };
}

/// Map NaN/infinite results to `None`.
pub(crate) fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
