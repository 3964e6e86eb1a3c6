//! Append-only per-group series used by the rolling forecaster

use crate::data::GroupKey;
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use crate::history::FeatureTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// The featured rows of one (bank, product) group, in ascending date order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeries {
    key: GroupKey,
    rows: Vec<FeatureRow>,
    productions: Vec<f64>,
}

impl GroupSeries {
    /// Create an empty series
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            rows: Vec::new(),
            productions: Vec::new(),
        }
    }

    /// Append a row dated after every existing row
    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        if row.key != self.key {
            return Err(ForecastError::DataError(format!(
                "Row for {} appended to series {}",
                row.key, self.key
            )));
        }
        if let Some(last) = self.rows.last() {
            if row.date <= last.date {
                return Err(ForecastError::DataError(format!(
                    "Series {} already has a row on or after {}",
                    self.key, row.date
                )));
            }
        }

        self.productions.push(row.production);
        self.rows.push(row);
        Ok(())
    }

    /// Group key
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Rows in date order
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Most recent row
    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Production values in date order
    pub fn productions(&self) -> &[f64] {
        &self.productions
    }

    /// Production on an exact date, if the series has a row for it
    pub fn production_on(&self, date: NaiveDate) -> Option<f64> {
        self.rows
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|idx| self.productions[idx])
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the series has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every group's series, keyed and iterated in group order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSeries {
    groups: BTreeMap<GroupKey, GroupSeries>,
}

impl WorkingSeries {
    /// Split a feature table into per-group series
    pub fn from_table(table: &FeatureTable) -> Result<Self> {
        let mut rows = table.rows().to_vec();
        rows.sort_by(|a, b| a.key.cmp(&b.key).then(a.date.cmp(&b.date)));

        let mut working = Self::default();
        for row in rows {
            working.push(row)?;
        }
        Ok(working)
    }

    /// Append one row to its group's series
    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        self.groups
            .entry(row.key.clone())
            .or_insert_with(|| GroupSeries::new(row.key.clone()))
            .push(row)
    }

    /// Append a batch of rows
    pub fn extend(&mut self, rows: Vec<FeatureRow>) -> Result<()> {
        rows.into_iter().try_for_each(|row| self.push(row))
    }

    /// Series of one group
    pub fn get(&self, key: &GroupKey) -> Option<&GroupSeries> {
        self.groups.get(key)
    }

    /// Iterate series in group order
    pub fn iter(&self) -> impl Iterator<Item = &GroupSeries> {
        self.groups.values()
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

}
