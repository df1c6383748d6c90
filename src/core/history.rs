//! Rolling window of timestamped snapshots for trend charts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::bridge_metrics::BridgeSnapshot;
use crate::utils::MAX_HISTORICAL_POINTS;

/// A snapshot together with the time the poller captured it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    #[serde(flatten)]
    pub snapshot: BridgeSnapshot,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
}

/// Oldest-first, bounded sequence of snapshots.
///
/// Appending consumes the history and returns the new value, so whoever
/// owns it swaps its reference instead of mutating a shared buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    #[serde(skip)]
    capacity: usize,
    entries: VecDeque<HistoricalSnapshot>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history holding up to `MAX_HISTORICAL_POINTS`.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORICAL_POINTS)
    }

    /// Create an empty history with a custom bound (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a snapshot, evicting from the front once over capacity.
    pub fn append(mut self, snapshot: BridgeSnapshot, captured_at: DateTime<Utc>) -> Self {
        self.entries.push_back(HistoricalSnapshot {
            snapshot,
            captured_at,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self
    }

    /// Same bound, no entries
    pub fn cleared(&self) -> Self {
        Self::with_capacity(self.capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoricalSnapshot> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoricalSnapshot> {
        self.entries.back()
    }

    /// Project one numeric field over time: `(capture time, value)` pairs,
    /// oldest first.
    pub fn series<F>(&self, value: F) -> Vec<(DateTime<Utc>, f64)>
    where
        F: Fn(&BridgeSnapshot) -> f64,
    {
        self.entries
            .iter()
            .map(|entry| (entry.captured_at, value(&entry.snapshot)))
            .collect()
    }
}
