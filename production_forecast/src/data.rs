//! Historical production data: observations, group keys and loading

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Columns every historical table must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "bank", "product", "production"];

/// Composite key identifying one forecasting group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    /// Bank identifier
    pub bank: String,
    /// Product identifier
    pub product: String,
}

impl GroupKey {
    /// Create a new group key
    pub fn new(bank: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            bank: bank.into(),
            product: product.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bank, self.product)
    }
}

/// One observed production value for a group on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Bank identifier
    pub bank: String,
    /// Product identifier
    pub product: String,
    /// Production value
    pub production: f64,
}

impl Observation {
    /// Create a new observation
    pub fn new(
        date: NaiveDate,
        bank: impl Into<String>,
        product: impl Into<String>,
        production: f64,
    ) -> Self {
        Self {
            date,
            bank: bank.into(),
            product: product.into(),
            production,
        }
    }

    /// The (bank, product) group this observation belongs to
    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.bank.clone(), self.product.clone())
    }
}

/// Loader for historical observation tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Load observations from a Parquet file
    pub fn from_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        let df = ParquetReader::new(file).finish()?;

        Self::from_dataframe(df)
    }

    /// Load observations from a file, choosing the reader by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") => Self::from_parquet(path),
            Some("csv") | None => Self::from_csv(path),
            Some(other) => Err(ForecastError::InvalidParameter(format!(
                "Unsupported data file extension: {}",
                other
            ))),
        }
    }

    /// Convert an existing DataFrame into observations
    pub fn from_dataframe(df: DataFrame) -> Result<Vec<Observation>> {
        Self::check_required_columns(&df)?;

        let df = df
            .lazy()
            .select([
                col("date").cast(DataType::Utf8),
                col("bank").cast(DataType::Utf8),
                col("product").cast(DataType::Utf8),
                col("production").cast(DataType::Float64),
            ])
            .collect()?;

        let dates = df.column("date")?.utf8()?;
        let banks = df.column("bank")?.utf8()?;
        let products = df.column("product")?.utf8()?;
        let productions = df.column("production")?.f64()?;

        let mut observations = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for (((date, bank), product), production) in dates
            .into_iter()
            .zip(banks.into_iter())
            .zip(products.into_iter())
            .zip(productions.into_iter())
        {
            let (Some(date), Some(bank), Some(product), Some(production)) =
                (date, bank, product, production)
            else {
                skipped += 1;
                continue;
            };

            observations.push(Observation::new(
                parse_date(date)?,
                bank,
                product,
                production,
            ));
        }

        ensure_unique(&observations)?;

        if skipped > 0 {
            warn!(skipped, "Skipped rows with missing required values");
        }
        info!(rows = observations.len(), "Loaded historical observations");

        Ok(observations)
    }

    /// Fail before any computation if a required column is absent
    fn check_required_columns(df: &DataFrame) -> Result<()> {
        let column_names = df.get_column_names();

        for required in REQUIRED_COLUMNS {
            if !column_names.iter().any(|name| *name == required) {
                return Err(ForecastError::MissingColumn(required.to_string()));
            }
        }

        Ok(())
    }
}

/// Fail with a `DataError` if two observations share a (date, bank, product) key
pub fn ensure_unique(observations: &[Observation]) -> Result<()> {
    let mut seen = HashSet::with_capacity(observations.len());
    for obs in observations {
        if !seen.insert((obs.date, obs.bank.as_str(), obs.product.as_str())) {
            return Err(ForecastError::DataError(format!(
                "Duplicate observation for {} on {}",
                obs.key(),
                obs.date
            )));
        }
    }
    Ok(())
}

/// Parse a date written as `YYYY-MM-DD`, optionally followed by a time part
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let date_part = match raw.get(..10) {
        Some(prefix) if raw.len() == 10 || matches!(raw.as_bytes()[10], b' ' | b'T') => prefix,
        _ => raw,
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{}': {}", raw, e)))
}
