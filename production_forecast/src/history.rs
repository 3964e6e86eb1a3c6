//! Historical feature building
//!
//! Turns a raw observation table into fully featured rows with no lookahead:
//! group statistics, cross features, calendar flags and the per-group trend
//! counter, followed by the zero fill policy and a final drop of any row that
//! is still incomplete.

use crate::calendar::{CalendarFeatures, HolidayCalendar};
use crate::cross;
use crate::data::{self, GroupKey, Observation};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, GroupFeatures, Lag, Scope, Window};
use crate::group_stats::{self, RowStats};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Fully featured historical rows, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Wrap already featured rows
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    /// Featured rows
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Latest date in the table
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|row| row.date).max()
    }

    /// Find the row of a group on a date
    pub fn find(&self, key: &GroupKey, date: NaiveDate) -> Option<&FeatureRow> {
        self.rows
            .iter()
            .find(|row| row.date == date && &row.key == key)
    }
}

/// Builds a [`FeatureTable`] from historical observations
#[derive(Debug, Clone)]
pub struct HistoricalFeatureBuilder<C> {
    calendar: C,
}

impl<C: HolidayCalendar> HistoricalFeatureBuilder<C> {
    /// Create a builder using `calendar` for holiday flags
    pub fn new(calendar: C) -> Self {
        Self { calendar }
    }

    /// Build the featured table
    pub fn build(&self, observations: &[Observation]) -> Result<FeatureTable> {
        if observations.is_empty() {
            return Err(ForecastError::DataError(
                "No historical observations to build features from".to_string(),
            ));
        }
        data::ensure_unique(observations)?;

        let stats = group_stats::compute(observations)?;

        let first_date = observations.iter().map(|o| o.date).min();
        let last_date = observations.iter().map(|o| o.date).max();

        let mut rows = Vec::with_capacity(observations.len());
        let mut dropped = 0usize;

        for (obs, stats) in observations.iter().zip(stats.iter()) {
            let mut calendar = CalendarFeatures::for_date(obs.date, &self.calendar);
            if Some(obs.date) == first_date {
                calendar.is_post_holiday = false;
            }
            if Some(obs.date) == last_date {
                calendar.is_pre_holiday = false;
            }

            let row = featured_row(obs, stats, calendar);
            if row.is_complete() {
                rows.push(row);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!(dropped, "Dropped rows with undefined features after fill");
        }
        info!(
            rows = rows.len(),
            groups = group_stats::pair_series(observations).len(),
            "Built historical feature table"
        );

        Ok(FeatureTable::new(rows))
    }
}

/// Assemble one row and apply the zero fill policy
fn featured_row(obs: &Observation, stats: &RowStats, calendar: CalendarFeatures) -> FeatureRow {
    let means = Scope::ALL.map(|scope| stats.scope(scope).mean);
    let slots = Lag::ALL.map(|lag| stats.lag(lag));
    let cross = cross::fill(cross::derive(slots, means), 0.0, 0.0);

    let zero = |value: Option<f64>| value.unwrap_or(0.0);

    FeatureRow {
        date: obs.date,
        key: obs.key(),
        production: obs.production,
        stats: GroupFeatures {
            mean: means.map(zero),
            std: Scope::ALL.map(|scope| zero(stats.scope(scope).std)),
            lag: slots.map(zero),
            rolling_mean: Window::ALL.map(|w| zero(stats.rolling(w).mean)),
            rolling_std: Window::ALL.map(|w| zero(stats.rolling(w).std)),
        },
        cross,
        trend: stats.trend,
        calendar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidaySet;
    use crate::features::FeatureName;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_first_row_of_a_group_is_zero_filled() {
        let obs = vec![Observation::new(day(1), "A", "X", 50.0)];
        let table = HistoricalFeatureBuilder::new(HolidaySet::default())
            .build(&obs)
            .unwrap();

        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        let row = &table.rows()[0];
        for name in FeatureName::canonical() {
            if matches!(
                name,
                FeatureName::Weekday
                    | FeatureName::DayOfWeek
                    | FeatureName::Month
                    | FeatureName::Fortnight
            ) {
                continue;
            }
            assert_eq!(row.value(&name), 0.0, "{}", name.name());
        }
    }

    #[test]
    fn test_non_finite_production_rows_are_dropped() {
        let obs = vec![
            Observation::new(day(1), "A", "X", 50.0),
            Observation::new(day(2), "A", "X", f64::NAN),
            Observation::new(day(3), "A", "X", 70.0),
        ];
        let table = HistoricalFeatureBuilder::new(HolidaySet::default())
            .build(&obs)
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].trend, 2);
    }

    #[test]
    fn test_global_boundary_holiday_flags() {
        // holidays just outside both ends of the data
        let cal = HolidaySet::new([day(1), day(5)]);
        let obs = vec![
            Observation::new(day(2), "A", "X", 1.0),
            Observation::new(day(3), "A", "X", 1.0),
            Observation::new(day(4), "A", "X", 1.0),
            Observation::new(day(3), "B", "X", 1.0),
        ];

        let table = HistoricalFeatureBuilder::new(cal).build(&obs).unwrap();

        assert!(!table.rows()[0].calendar.is_post_holiday);
        assert!(!table.rows()[2].calendar.is_pre_holiday);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = HistoricalFeatureBuilder::new(HolidaySet::default()).build(&[]);
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn test_duplicate_dates_in_a_group_are_rejected() {
        let obs = vec![
            Observation::new(day(1), "A", "X", 10.0),
            Observation::new(day(2), "A", "X", 20.0),
            Observation::new(day(2), "A", "X", 999.0),
        ];

        let result = HistoricalFeatureBuilder::new(HolidaySet::default()).build(&obs);

        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }
}
