//! Rolling multi-step forecasting
//!
//! For each future date, one feature row is synthesized per group from that
//! group's series (history plus every prediction made so far), the whole batch
//! is scored by the model, and the finalized rows are appended before moving
//! to the next date. Synthesis for a date reads the series as they were
//! before any of that date's predictions were appended.
//!
//! Expanding means and standard deviations are carried forward from each
//! group's last historical row and are not recomputed during the horizon.
//! Lags and rolling statistics are recomputed every step and do see
//! appended predictions.

use crate::calendar::{CalendarFeatures, HolidayCalendar};
use crate::config::ForecastConfig;
use crate::cross;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureMatrix, FeatureRow, GroupFeatures, Lag, Window};
use crate::history::FeatureTable;
use crate::model::RegressionModel;
use crate::output::ForecastRecord;
use crate::series::{GroupSeries, WorkingSeries};
use chrono::{Days, NaiveDate};
use feature_math::{tail_mean, tail_std, RATIO_EPSILON};
use tracing::{debug, info};

/// Result of a forecast run
#[derive(Debug, Clone)]
pub struct Forecast {
    records: Vec<ForecastRecord>,
    series: WorkingSeries,
}

impl Forecast {
    /// Predictions sorted by date, then bank, then product
    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    /// Every group's series, history followed by predicted rows
    pub fn series(&self) -> &WorkingSeries {
        &self.series
    }
}

/// Iterative forecaster feeding its own predictions back as history
#[derive(Debug)]
pub struct RollingForecaster<M, C> {
    model: M,
    calendar: C,
    config: ForecastConfig,
}

impl<M: RegressionModel, C: HolidayCalendar> RollingForecaster<M, C> {
    /// Create a forecaster
    pub fn new(model: M, calendar: C, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            calendar,
            config,
        })
    }

    /// Forecast every group in `table` over the configured horizon
    pub fn forecast(&self, table: &FeatureTable) -> Result<Forecast> {
        let last_date = table.last_date().ok_or_else(|| {
            ForecastError::DataError("Cannot forecast from an empty feature table".to_string())
        })?;

        let horizon = self.config.horizon;
        u64::try_from(horizon)
            .ok()
            .and_then(|days| last_date.checked_add_days(Days::new(days)))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Horizon of {} days from {} overflows the calendar",
                    horizon, last_date
                ))
            })?;

        let mut series = WorkingSeries::from_table(table)?;
        let schema = self.model.feature_schema().to_vec();

        info!(
            groups = series.group_count(),
            horizon,
            %last_date,
            "Starting rolling forecast"
        );

        let mut records = Vec::new();
        let mut date = last_date;

        for step in 1..=horizon {
            date = date.succ_opt().ok_or_else(|| {
                ForecastError::InvalidParameter(format!("No calendar day after {}", date))
            })?;

            let mut batch: Vec<FeatureRow> = series
                .iter()
                .filter_map(|group| synthesize_row(group, date, &self.calendar))
                .collect();

            let matrix = FeatureMatrix::project(&batch, &schema);
            let raw = self.model.predict(&matrix)?;
            if raw.len() != batch.len() {
                return Err(ForecastError::ModelError(format!(
                    "Model returned {} predictions for {} rows",
                    raw.len(),
                    batch.len()
                )));
            }

            for (row, raw) in batch.iter_mut().zip(raw) {
                row.production = inverse_transform(raw);
            }

            records.extend(batch.iter().map(ForecastRecord::from));
            series.extend(batch)?;

            debug!(step, %date, "Forecast step complete");
        }

        records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.bank.cmp(&b.bank))
                .then_with(|| a.product.cmp(&b.product))
        });

        info!(rows = records.len(), "Rolling forecast finished");

        Ok(Forecast { records, series })
    }
}

/// Build the feature row of `series` for `date`, or `None` for an empty series.
///
/// The row's production is left undefined until the model scores it.
pub fn synthesize_row<C: HolidayCalendar + ?Sized>(
    series: &GroupSeries,
    date: NaiveDate,
    calendar: &C,
) -> Option<FeatureRow> {
    let last = series.last()?;
    let values = series.productions();

    let lag_1 = last.production;
    let lag_on = |days: u64| {
        date.checked_sub_days(Days::new(days))
            .and_then(|day| series.production_on(day))
            .unwrap_or(lag_1)
    };

    let rolling_mean = Window::ALL.map(|w| tail_mean(values, w.size()));
    let rolling_std = Window::ALL.map(|w| tail_std(values, w.size()));

    let means = last.stats.mean;
    let slots = [
        Some(lag_1),
        rolling_mean[Window::W7.index()],
        rolling_mean[Window::W30.index()],
    ];
    let cross = cross::fill(cross::derive(slots, means.map(Some)), 0.0, RATIO_EPSILON);

    let mut lag = [lag_1; 3];
    lag[Lag::L7.index()] = lag_on(7);
    lag[Lag::L30.index()] = lag_on(30);

    Some(FeatureRow {
        date,
        key: series.key().clone(),
        production: f64::NAN,
        stats: GroupFeatures {
            mean: means,
            std: last.stats.std,
            lag,
            rolling_mean: rolling_mean.map(|v| v.unwrap_or(f64::NAN)),
            rolling_std: rolling_std.map(|v| v.unwrap_or(f64::NAN)),
        },
        cross,
        trend: last.trend + 1,
        calendar: CalendarFeatures::for_date(date, calendar),
    })
}

/// Undo the log1p training transform and clip to a valid production value
pub fn inverse_transform(raw: f64) -> f64 {
    let value = raw.exp_m1();
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidaySet;
    use crate::data::{GroupKey, Observation};
    use crate::history::HistoricalFeatureBuilder;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn table(obs: &[Observation]) -> FeatureTable {
        HistoricalFeatureBuilder::new(HolidaySet::default())
            .build(obs)
            .unwrap()
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(-1000.0, 0.0)]
    #[case(1e6, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(2.0f64.ln_1p(), 2.0)]
    fn test_inverse_transform(#[case] raw: f64, #[case] expected: f64) {
        assert_relative_eq!(inverse_transform(raw), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_synthesized_row_for_short_history() {
        let obs = vec![
            Observation::new(day(1), "A", "X", 100.0),
            Observation::new(day(2), "A", "X", 110.0),
            Observation::new(day(3), "A", "X", 120.0),
        ];
        let working = WorkingSeries::from_table(&table(&obs)).unwrap();
        let series = working.get(&GroupKey::new("A", "X")).unwrap();

        let row = synthesize_row(series, day(4), &HolidaySet::default()).unwrap();

        assert_eq!(row.stats.lag, [120.0; 3]);
        assert_relative_eq!(row.stats.rolling_mean[Window::W7.index()], 110.0);
        assert_relative_eq!(row.stats.rolling_std[Window::W7.index()], 10.0);
        assert_eq!(row.trend, 3);
        // carried from the last historical row: mean of 100 and 110
        assert_relative_eq!(row.stats.mean[2], 105.0);
    }

    #[test]
    fn test_lag_7_uses_exact_date_when_present() {
        let obs: Vec<Observation> = (1..=10)
            .map(|d| Observation::new(day(d), "A", "X", d as f64))
            .collect();
        let working = WorkingSeries::from_table(&table(&obs)).unwrap();
        let series = working.get(&GroupKey::new("A", "X")).unwrap();

        let row = synthesize_row(series, day(11), &HolidaySet::default()).unwrap();

        assert_eq!(row.stats.lag[Lag::L1.index()], 10.0);
        assert_eq!(row.stats.lag[Lag::L7.index()], 4.0);
        assert_eq!(row.stats.lag[Lag::L30.index()], 10.0);
    }

    #[test]
    fn test_horizon_past_the_calendar_is_rejected() {
        let obs = vec![
            Observation::new(day(1), "A", "X", 1.0),
            Observation::new(day(1), "B", "X", 2.0),
            Observation::new(day(1), "B", "Y", 3.0),
        ];
        let model = crate::model::LinearModel::new(vec![], vec![], 0.0).unwrap();
        let config = ForecastConfig::with_horizon(usize::MAX / 2).unwrap();
        let forecaster = RollingForecaster::new(model, HolidaySet::default(), config).unwrap();

        let result = forecaster.forecast(&table(&obs));

        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}
