//! Run configuration

use crate::calendar::{BrazilianHolidays, ExtendedCalendar, HolidayCalendar, HolidaySet};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default number of future days to forecast
pub const DEFAULT_HORIZON: usize = 180;

/// Which built-in holiday calendar to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    /// Brazilian national holidays
    #[default]
    Brazil,
    /// No built-in holidays; only `extra_holidays` apply
    None,
}

/// Forecast run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future days to forecast
    pub horizon: usize,
    /// Built-in holiday calendar
    pub holiday_calendar: CalendarKind,
    /// Additional holiday dates (regional holidays, bridges)
    pub extra_holidays: Vec<NaiveDate>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            holiday_calendar: CalendarKind::default(),
            extra_holidays: Vec::new(),
        }
    }
}

impl ForecastConfig {
    /// Create a configuration with the given horizon and default calendar
    pub fn with_horizon(horizon: usize) -> Result<Self> {
        let config = Self {
            horizon,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: ForecastConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Holiday calendar described by this configuration
    pub fn calendar(&self) -> Box<dyn HolidayCalendar + Send + Sync> {
        let extra = HolidaySet::new(self.extra_holidays.iter().copied());
        match self.holiday_calendar {
            CalendarKind::Brazil => Box::new(ExtendedCalendar::new(BrazilianHolidays, extra)),
            CalendarKind::None => Box::new(extra),
        }
    }
}
