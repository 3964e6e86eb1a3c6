//! Feature rows, feature names and projection onto a model schema
//!
//! A [`FeatureRow`] carries every derived value for one group on one date.
//! Models consume a [`FeatureMatrix`] whose columns follow the model's own
//! schema; [`FeatureMatrix::project`] performs that reindexing, filling
//! unknown columns with 0 and replacing undefined values with 0.

use crate::calendar::{weekday_name, CalendarFeatures, Fortnight};
use crate::data::GroupKey;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregation scope of a group statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// All products of a bank
    Bank,
    /// All banks of a product
    Product,
    /// A single (bank, product) pair
    BankProduct,
}

impl Scope {
    /// Every scope in feature order
    pub const ALL: [Scope; 3] = [Scope::Bank, Scope::Product, Scope::BankProduct];

    /// Position in scope-indexed arrays
    pub fn index(&self) -> usize {
        match self {
            Scope::Bank => 0,
            Scope::Product => 1,
            Scope::BankProduct => 2,
        }
    }

    /// Suffix used by `mean_*` and `std_*`
    fn stat_suffix(&self) -> &'static str {
        match self {
            Scope::Bank => "bank",
            Scope::Product => "product",
            Scope::BankProduct => "bp",
        }
    }

    /// Suffix used by the cross features
    fn cross_suffix(&self) -> &'static str {
        match self {
            Scope::Bank => "bank",
            Scope::Product => "product",
            Scope::BankProduct => "bank_product",
        }
    }
}

/// Lag distances, in positions of the pair series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lag {
    L1,
    L7,
    L30,
}

impl Lag {
    /// Every lag in feature order
    pub const ALL: [Lag; 3] = [Lag::L1, Lag::L7, Lag::L30];

    /// Number of steps back
    pub fn steps(&self) -> usize {
        match self {
            Lag::L1 => 1,
            Lag::L7 => 7,
            Lag::L30 => 30,
        }
    }

    /// Position in lag-indexed arrays
    pub fn index(&self) -> usize {
        match self {
            Lag::L1 => 0,
            Lag::L7 => 1,
            Lag::L30 => 2,
        }
    }

    fn from_steps(steps: &str) -> Option<Lag> {
        Lag::ALL.into_iter().find(|lag| lag.steps().to_string() == steps)
    }
}

/// Rolling window lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    W7,
    W30,
    W60,
}

impl Window {
    /// Every window in feature order
    pub const ALL: [Window; 3] = [Window::W7, Window::W30, Window::W60];

    /// Number of values in the window
    pub fn size(&self) -> usize {
        match self {
            Window::W7 => 7,
            Window::W30 => 30,
            Window::W60 => 60,
        }
    }

    /// Position in window-indexed arrays
    pub fn index(&self) -> usize {
        match self {
            Window::W7 => 0,
            Window::W30 => 1,
            Window::W60 => 2,
        }
    }

    fn from_len(len: &str) -> Option<Window> {
        Window::ALL.into_iter().find(|w| w.size().to_string() == len)
    }
}

/// Group statistics attributed to one row. `NaN` marks an undefined value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupFeatures {
    /// Expanding means, indexed by [`Scope`]
    pub mean: [f64; 3],
    /// Expanding standard deviations, indexed by [`Scope`]
    pub std: [f64; 3],
    /// Lagged values, indexed by [`Lag`]
    pub lag: [f64; 3],
    /// Rolling means, indexed by [`Window`]
    pub rolling_mean: [f64; 3],
    /// Rolling standard deviations, indexed by [`Window`]
    pub rolling_std: [f64; 3],
}

/// Differences and ratios between lag slots and scope means
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossFeatures {
    /// `diff_mean_lag{L}_{scope}`, indexed `[lag][scope]`
    pub diff: [[f64; 3]; 3],
    /// `ratio_mean_lag{L}_{scope}`, indexed `[lag][scope]`
    pub ratio: [[f64; 3]; 3],
}

/// Every feature of one group on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Row date
    pub date: NaiveDate,
    /// Group the row belongs to
    pub key: GroupKey,
    /// Observed or predicted production
    pub production: f64,
    /// Expanding, lag and rolling statistics
    pub stats: GroupFeatures,
    /// Lag/mean differences and ratios
    pub cross: CrossFeatures,
    /// 0-based position in the group's series
    pub trend: u64,
    /// Calendar and holiday flags
    pub calendar: CalendarFeatures,
}

impl FeatureRow {
    /// Numeric value of a named feature
    pub fn value(&self, name: &FeatureName) -> f64 {
        let cal = &self.calendar;
        match *name {
            FeatureName::Mean(scope) => self.stats.mean[scope.index()],
            FeatureName::Std(scope) => self.stats.std[scope.index()],
            FeatureName::Lag(lag) => self.stats.lag[lag.index()],
            FeatureName::RollingMean(w) => self.stats.rolling_mean[w.index()],
            FeatureName::RollingStd(w) => self.stats.rolling_std[w.index()],
            FeatureName::DiffMean(lag, scope) => self.cross.diff[lag.index()][scope.index()],
            FeatureName::RatioMean(lag, scope) => self.cross.ratio[lag.index()][scope.index()],
            FeatureName::Trend => self.trend as f64,
            FeatureName::Weekday | FeatureName::DayOfWeek => cal.weekday as f64,
            FeatureName::DayOfWeekIs(day) => flag(cal.weekday == day),
            FeatureName::Month => cal.month as f64,
            FeatureName::IsMonthEnd => flag(cal.is_month_end),
            FeatureName::Fortnight => cal.fortnight.code(),
            FeatureName::FortnightIs(second) => flag((cal.fortnight == Fortnight::Second) == second),
            FeatureName::IsWeekend => flag(cal.is_weekend),
            FeatureName::IsHoliday => flag(cal.is_holiday),
            FeatureName::IsPreHoliday => flag(cal.is_pre_holiday),
            FeatureName::IsPostHoliday => flag(cal.is_post_holiday),
        }
    }

    /// Whether every numeric feature is defined
    pub fn is_complete(&self) -> bool {
        self.production.is_finite()
            && FeatureName::canonical()
                .iter()
                .all(|name| self.value(name).is_finite())
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// A feature the model may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureName {
    Mean(Scope),
    Std(Scope),
    Lag(Lag),
    RollingMean(Window),
    RollingStd(Window),
    DiffMean(Lag, Scope),
    RatioMean(Lag, Scope),
    Trend,
    Weekday,
    /// Categorical weekday, fed as its index
    DayOfWeek,
    /// One-hot weekday column, e.g. `day_of_week_Monday`
    DayOfWeekIs(u32),
    Month,
    IsMonthEnd,
    /// Categorical fortnight, fed as 0/1
    Fortnight,
    /// One-hot fortnight column; `true` for the second fortnight
    FortnightIs(bool),
    IsWeekend,
    IsHoliday,
    IsPreHoliday,
    IsPostHoliday,
}

impl FeatureName {
    /// Parse a schema column name
    pub fn parse(name: &str) -> Option<FeatureName> {
        let fixed = match name {
            "trend" => Some(FeatureName::Trend),
            "weekday" => Some(FeatureName::Weekday),
            "day_of_week" => Some(FeatureName::DayOfWeek),
            "month" => Some(FeatureName::Month),
            "is_month_end" => Some(FeatureName::IsMonthEnd),
            "fortnight" => Some(FeatureName::Fortnight),
            "is_weekend" => Some(FeatureName::IsWeekend),
            "is_holiday" => Some(FeatureName::IsHoliday),
            "is_pre_holiday" => Some(FeatureName::IsPreHoliday),
            "is_post_holiday" => Some(FeatureName::IsPostHoliday),
            "fortnight_First Fortnight" => Some(FeatureName::FortnightIs(false)),
            "fortnight_Second Fortnight" => Some(FeatureName::FortnightIs(true)),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }

        if let Some(day) = name.strip_prefix("day_of_week_") {
            return (0..7)
                .find(|&i| weekday_name(i) == day)
                .map(FeatureName::DayOfWeekIs);
        }
        if let Some(rest) = name.strip_prefix("diff_mean_lag") {
            let (lag, scope) = parse_cross(rest)?;
            return Some(FeatureName::DiffMean(lag, scope));
        }
        if let Some(rest) = name.strip_prefix("ratio_mean_lag") {
            let (lag, scope) = parse_cross(rest)?;
            return Some(FeatureName::RatioMean(lag, scope));
        }
        if let Some(steps) = name.strip_prefix("lag_") {
            return Lag::from_steps(steps).map(FeatureName::Lag);
        }
        if let Some(len) = name.strip_prefix("rolling_mean_") {
            return Window::from_len(len).map(FeatureName::RollingMean);
        }
        if let Some(len) = name.strip_prefix("rolling_std_") {
            return Window::from_len(len).map(FeatureName::RollingStd);
        }
        if let Some(suffix) = name.strip_prefix("mean_") {
            return scope_by_stat_suffix(suffix).map(FeatureName::Mean);
        }
        if let Some(suffix) = name.strip_prefix("std_") {
            return scope_by_stat_suffix(suffix).map(FeatureName::Std);
        }

        None
    }

    /// Column name of the feature
    pub fn name(&self) -> String {
        match *self {
            FeatureName::Mean(scope) => format!("mean_{}", scope.stat_suffix()),
            FeatureName::Std(scope) => format!("std_{}", scope.stat_suffix()),
            FeatureName::Lag(lag) => format!("lag_{}", lag.steps()),
            FeatureName::RollingMean(w) => format!("rolling_mean_{}", w.size()),
            FeatureName::RollingStd(w) => format!("rolling_std_{}", w.size()),
            FeatureName::DiffMean(lag, scope) => {
                format!("diff_mean_lag{}_{}", lag.steps(), scope.cross_suffix())
            }
            FeatureName::RatioMean(lag, scope) => {
                format!("ratio_mean_lag{}_{}", lag.steps(), scope.cross_suffix())
            }
            FeatureName::Trend => "trend".to_string(),
            FeatureName::Weekday => "weekday".to_string(),
            FeatureName::DayOfWeek => "day_of_week".to_string(),
            FeatureName::DayOfWeekIs(day) => format!("day_of_week_{}", weekday_name(day)),
            FeatureName::Month => "month".to_string(),
            FeatureName::IsMonthEnd => "is_month_end".to_string(),
            FeatureName::Fortnight => "fortnight".to_string(),
            FeatureName::FortnightIs(false) => "fortnight_First Fortnight".to_string(),
            FeatureName::FortnightIs(true) => "fortnight_Second Fortnight".to_string(),
            FeatureName::IsWeekend => "is_weekend".to_string(),
            FeatureName::IsHoliday => "is_holiday".to_string(),
            FeatureName::IsPreHoliday => "is_pre_holiday".to_string(),
            FeatureName::IsPostHoliday => "is_post_holiday".to_string(),
        }
    }

    /// Every numeric feature in canonical order
    pub fn canonical() -> Vec<FeatureName> {
        let mut names = Vec::with_capacity(45);
        names.extend(Scope::ALL.map(FeatureName::Mean));
        names.extend(Scope::ALL.map(FeatureName::Std));
        names.extend(Lag::ALL.map(FeatureName::Lag));
        names.extend(Window::ALL.map(FeatureName::RollingMean));
        names.extend(Window::ALL.map(FeatureName::RollingStd));
        for scope in Scope::ALL {
            names.extend(Lag::ALL.map(|lag| FeatureName::DiffMean(lag, scope)));
        }
        for scope in Scope::ALL {
            names.extend(Lag::ALL.map(|lag| FeatureName::RatioMean(lag, scope)));
        }
        names.extend([
            FeatureName::Trend,
            FeatureName::Weekday,
            FeatureName::DayOfWeek,
            FeatureName::Month,
            FeatureName::IsMonthEnd,
            FeatureName::Fortnight,
            FeatureName::IsWeekend,
            FeatureName::IsHoliday,
            FeatureName::IsPreHoliday,
            FeatureName::IsPostHoliday,
        ]);
        names
    }

    /// Column names of [`FeatureName::canonical`]
    pub fn canonical_names() -> Vec<String> {
        Self::canonical().iter().map(FeatureName::name).collect()
    }
}

fn parse_cross(rest: &str) -> Option<(Lag, Scope)> {
    let (steps, scope) = rest.split_once('_')?;
    let scope = match scope {
        "bank" => Scope::Bank,
        "product" => Scope::Product,
        "bank_product" => Scope::BankProduct,
        _ => return None,
    };
    Some((Lag::from_steps(steps)?, scope))
}

fn scope_by_stat_suffix(suffix: &str) -> Option<Scope> {
    Scope::ALL.into_iter().find(|s| s.stat_suffix() == suffix)
}

/// Model input: one row per group, columns in model schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Reindex `rows` onto `schema`.
    ///
    /// Columns the rows cannot supply are filled with 0. Infinite or NaN
    /// values are replaced with 0.
    pub fn project(rows: &[FeatureRow], schema: &[String]) -> Self {
        let names: Vec<Option<FeatureName>> =
            schema.iter().map(|name| FeatureName::parse(name)).collect();

        let rows = rows
            .iter()
            .map(|row| {
                names
                    .iter()
                    .map(|name| match name {
                        Some(name) => finite_or_zero(row.value(name)),
                        None => 0.0,
                    })
                    .collect()
            })
            .collect();

        Self {
            columns: schema.to_vec(),
            rows,
        }
    }

    /// Build a matrix from raw parts; every row must have one value per column
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ForecastError::DataError(format!(
                "Matrix row {} has {} values for {} columns",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Matrix rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one named column, if present
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Replace NaN and infinities with 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_canonical_names_round_trip() {
        let names = FeatureName::canonical_names();
        assert_eq!(names.len(), 43);

        for name in &names {
            let parsed = FeatureName::parse(name).expect(name);
            assert_eq!(&parsed.name(), name);
        }
    }

    #[rstest]
    #[case("ratio_mean_lag1_bank", FeatureName::RatioMean(Lag::L1, Scope::Bank))]
    #[case(
        "diff_mean_lag30_bank_product",
        FeatureName::DiffMean(Lag::L30, Scope::BankProduct)
    )]
    #[case("mean_bp", FeatureName::Mean(Scope::BankProduct))]
    #[case("rolling_std_60", FeatureName::RollingStd(Window::W60))]
    #[case("day_of_week_Sunday", FeatureName::DayOfWeekIs(6))]
    #[case("fortnight_Second Fortnight", FeatureName::FortnightIs(true))]
    fn test_parse_feature_names(#[case] raw: &str, #[case] expected: FeatureName) {
        assert_eq!(FeatureName::parse(raw), Some(expected));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let columns = vec!["lag_1".to_string(), "trend".to_string()];

        let result = FeatureMatrix::from_rows(columns.clone(), vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(ForecastError::DataError(_))));

        let empty = FeatureMatrix::from_rows(columns, Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.column("trend"), Some(Vec::new()));
    }

    #[rstest]
    #[case("lag_2")]
    #[case("rolling_mean_14")]
    #[case("mean_bank_product")]
    #[case("diff_mean_lag7_region")]
    #[case("production")]
    fn test_unknown_feature_names(#[case] raw: &str) {
        assert_eq!(FeatureName::parse(raw), None);
    }
}
