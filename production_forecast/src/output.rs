//! Forecast records and CSV output

use crate::error::Result;
use crate::features::FeatureRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One forecast value for a group on a future date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub bank: String,
    pub product: String,
    pub prediction: f64,
}

impl From<&FeatureRow> for ForecastRecord {
    fn from(row: &FeatureRow) -> Self {
        Self {
            date: row.date,
            bank: row.key.bank.clone(),
            product: row.key.product.clone(),
            prediction: row.production,
        }
    }
}

/// Write records as CSV with a `date,bank,product,prediction` header.
///
/// The file is written next to `path` first and renamed into place, so a
/// failed write never leaves a partial file at `path`.
pub fn write_csv<P: AsRef<Path>>(records: &[ForecastRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let partial = path.with_extension("partial");

    let result = (|| -> Result<()> {
        let mut writer = csv::Writer::from_path(&partial)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&partial);
        return Err(err);
    }

    fs::rename(&partial, path)?;
    info!(rows = records.len(), path = %path.display(), "Wrote forecast");
    Ok(())
}

/// Read records back from a CSV written by [`write_csv`]
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ForecastRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}
