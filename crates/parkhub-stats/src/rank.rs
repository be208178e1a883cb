//! Insertion-ordered counters.

use serde::{Deserialize, Serialize};

/// One key and its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Counted key (place id, actor id, weekday, or month).
    pub key: String,
    /// Number of events seen for the key.
    pub count: u64,
}

/// Monotonic counters keyed by string, remembering first-seen order.
///
/// Cardinality is bounded by places, actors, 7 weekdays and 12 months, so
/// a vector with linear lookup is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    entries: Vec<RankEntry>,
}

impl RankTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `key`, inserting it at the end when unseen.
    pub fn increment(&mut self, key: &str) -> u64 {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.count += 1;
                entry.count
            }
            None => {
                self.entries.push(RankEntry {
                    key: key.to_string(),
                    count: 1,
                });
                1
            }
        }
    }

    /// Current count for `key`, zero when unseen.
    pub fn get(&self, key: &str) -> u64 {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map_or(0, |e| e.count)
    }

    /// Sum of every count.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by count, descending. Ties keep first-seen order.
    pub fn ranked(&self) -> Vec<RankEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }
}
