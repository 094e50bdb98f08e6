//! History bookkeeping.
//!
//! Two records live here:
//! - [`HistoryStore`]: for each compound state, the leaf that was active when
//!   it was last exited (deep history).
//! - [`TransitionLog`]: the ordered trace of control-state changes, in the
//!   spirit of an audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last active leaf under each compound state.
///
/// Entries are written every time a compound state is exited and are never
/// removed, so the store is bounded by the number of compound states.
///
/// # Example
///
/// ```rust
/// use statecraft::core::HistoryStore;
///
/// let mut history = HistoryStore::new();
/// history.record("cd_loaded_group", "cd_playing");
/// history.record("cd_loaded_group", "cd_paused");
///
/// assert_eq!(history.get("cd_loaded_group"), Some("cd_paused"));
/// assert_eq!(history.get("cd_loaded"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStore {
    entries: BTreeMap<String, String>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `leaf` as the last active leaf under `compound`.
    pub fn record(&mut self, compound: impl Into<String>, leaf: impl Into<String>) {
        self.entries.insert(compound.into(), leaf.into());
    }

    pub fn get(&self, compound: &str) -> Option<&str> {
        self.entries.get(compound).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(compound, leaf)` pairs ordered by compound name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }
}

/// Record of a single control-state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Leaf that was active before the change
    pub from: String,
    /// Leaf that became active
    pub to: String,
    /// Event that caused the change, the entry event for automatic ones
    pub event: String,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered trace of control-state changes.
///
/// With a capacity set, the oldest records are dropped first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
    capacity: Option<usize>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Append a record, returning the updated log.
    pub fn record(mut self, record: TransitionRecord) -> Self {
        self.records.push(record);
        if let Some(capacity) = self.capacity {
            let excess = self.records.len().saturating_sub(capacity);
            self.records.drain(..excess);
        }
        self
    }

    /// Leaves visited in order: the first source, then every target.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
