//! # Production Forecast
//!
//! Leakage-safe feature engineering and rolling multi-step forecasting for
//! daily production per (bank, product) group.
//!
//! ## Features
//!
//! - Loading observations from CSV, Parquet or an in-memory polars `DataFrame`
//! - Calendar and holiday annotation (Brazilian national calendar built in)
//! - Expanding statistics per bank, product and bank/product pair, using only
//!   strictly earlier dates
//! - Lags, rolling windows and cross features with explicit fallbacks
//! - Rolling forecaster that feeds each day's predictions back into the history
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use production_forecast::{
//!     DataLoader, ForecastConfig, HistoricalFeatureBuilder, LinearModel, RollingForecaster,
//! };
//!
//! let observations = DataLoader::from_csv("production.csv")?;
//! let config = ForecastConfig::with_horizon(30)?;
//!
//! let table = HistoricalFeatureBuilder::new(config.calendar()).build(&observations)?;
//! let model = LinearModel::from_json_file("model.json")?;
//!
//! let forecast = RollingForecaster::new(model, config.calendar(), config)?.forecast(&table)?;
//! production_forecast::output::write_csv(forecast.records(), "forecast.csv")?;
//! # Ok::<(), production_forecast::ForecastError>(())
//! ```

pub mod calendar;
pub mod config;
pub mod cross;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod group_stats;
pub mod history;
pub mod model;
pub mod output;
pub mod series;

// Re-export commonly used types
pub use crate::calendar::{BrazilianHolidays, CalendarFeatures, HolidayCalendar, HolidaySet};
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, GroupKey, Observation};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureMatrix, FeatureName, FeatureRow};
pub use crate::forecaster::{Forecast, RollingForecaster};
pub use crate::history::{FeatureTable, HistoricalFeatureBuilder};
pub use crate::model::{LinearModel, RegressionModel};
pub use crate::output::ForecastRecord;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
