//! Group statistics over a historical observation table
//!
//! Each grouping key (bank, product, bank × product) gets its own date-sorted
//! sequence. Expanding statistics attributed to a row only aggregate rows of
//! the same group dated strictly earlier: other products of the same bank on
//! the same date are not visible to each other.

use crate::data::{GroupKey, Observation};
use crate::error::Result;
use crate::features::{Lag, Scope, Window};
use feature_math::{lag_back, prior_expanding, prior_rolling, ExpandingStats, MeanStd};
use std::collections::BTreeMap;

/// Statistics attributed to one input row, before any fill policy
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowStats {
    /// Expanding mean/std per [`Scope`]
    pub scope: [MeanStd; 3],
    /// Lagged values per [`Lag`], falling back to the pair mean
    pub lag: [Option<f64>; 3],
    /// Rolling mean/std per [`Window`], falling back to the pair mean/std
    pub rolling: [MeanStd; 3],
    /// 0-based position in the pair series
    pub trend: u64,
}

impl RowStats {
    /// Expanding statistics for one scope
    pub fn scope(&self, scope: Scope) -> MeanStd {
        self.scope[scope.index()]
    }

    /// Lag value for one lag slot
    pub fn lag(&self, lag: Lag) -> Option<f64> {
        self.lag[lag.index()]
    }

    /// Rolling statistics for one window
    pub fn rolling(&self, window: Window) -> MeanStd {
        self.rolling[window.index()]
    }
}

/// Row indices of every (bank, product) series, each sorted by date
pub fn pair_series(observations: &[Observation]) -> BTreeMap<GroupKey, Vec<usize>> {
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (idx, obs) in observations.iter().enumerate() {
        groups.entry(obs.key()).or_default().push(idx);
    }
    for indices in groups.values_mut() {
        indices.sort_by_key(|&idx| observations[idx].date);
    }
    groups
}

/// Expanding mean/std of each row's group over strictly earlier dates
pub fn scope_expanding<'a, K, F>(observations: &'a [Observation], key: F) -> Vec<MeanStd>
where
    K: Ord,
    F: Fn(&'a Observation) -> K,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (idx, obs) in observations.iter().enumerate() {
        groups.entry(key(obs)).or_default().push(idx);
    }

    let mut result = vec![MeanStd::UNDEFINED; observations.len()];
    for mut indices in groups.into_values() {
        indices.sort_by_key(|&idx| observations[idx].date);

        let mut stats = ExpandingStats::new();
        for block in indices.chunk_by(|&a, &b| observations[a].date == observations[b].date) {
            let snapshot = stats.snapshot();
            for &idx in block {
                result[idx] = snapshot;
            }
            for &idx in block {
                stats.update(observations[idx].production);
            }
        }
    }

    result
}

/// Compute every group statistic for every row, aligned with `observations`
pub fn compute(observations: &[Observation]) -> Result<Vec<RowStats>> {
    let bank = scope_expanding(observations, |o| o.bank.as_str());
    let product = scope_expanding(observations, |o| o.product.as_str());

    let mut rows = vec![RowStats::default(); observations.len()];

    for indices in pair_series(observations).values() {
        let values: Vec<f64> = indices
            .iter()
            .map(|&idx| observations[idx].production)
            .collect();

        let pair = prior_expanding(&values);
        let rolling = Window::ALL
            .iter()
            .map(|w| prior_rolling(&values, w.size()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (pos, &idx) in indices.iter().enumerate() {
            let joint = pair[pos];
            let row = &mut rows[idx];

            row.scope = [bank[idx], product[idx], joint];
            row.trend = pos as u64;

            for lag in Lag::ALL {
                row.lag[lag.index()] = lag_back(&values, pos, lag.steps()).or(joint.mean);
            }
            for window in Window::ALL {
                let stats = rolling[window.index()][pos];
                row.rolling[window.index()] = MeanStd {
                    mean: stats.mean.or(joint.mean),
                    std: stats.std.or(joint.std),
                };
            }
        }
    }

    Ok(rows)
}
