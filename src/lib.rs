//! # Prodcast
//!
//! `prodcast` bundles the workspace crates behind one dependency:
//!
//! - [`math`]: window statistics computed without lookahead (`feature_math`)
//! - [`forecast`]: data loading, feature building and the rolling forecaster
//!   (`production_forecast`)
//!
//! ## Example
//!
//! ```
//! use prodcast::forecast::{HistoricalFeatureBuilder, HolidaySet, Observation};
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let history = vec![
//!     Observation::new(day(1), "A", "X", 100.0),
//!     Observation::new(day(2), "A", "X", 110.0),
//! ];
//!
//! let table = HistoricalFeatureBuilder::new(HolidaySet::default())
//!     .build(&history)
//!     .unwrap();
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.rows()[1].stats.lag[0], 100.0);
//! ```

pub use feature_math as math;
pub use production_forecast as forecast;

pub use production_forecast::{
    ForecastConfig, ForecastError, ForecastRecord, HistoricalFeatureBuilder, LinearModel,
    RegressionModel, RollingForecaster,
};
