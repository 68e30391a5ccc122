//! Bounded record of fired transitions.
//!
//! Each interpreter keeps the most recent transitions it executed, including
//! the internal ones fired while cascading through automatic states. The
//! trace is serializable so it can be dumped alongside a bug report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// One executed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: String,
    /// The event that triggered the transition (`auto` for eventless ones)
    pub event: String,
    /// The state entered, after history resolution
    pub to: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
    /// Zero for the externally sent event, then one more per cascade step
    pub cascade_depth: usize,
}

/// Ring buffer of the latest [`TransitionRecord`]s.
///
/// A capacity of zero disables recording.
///
/// # Example
///
/// ```rust
/// use syncflow::core::{TransitionRecord, TransitionTrace};
/// use chrono::Utc;
///
/// let mut trace = TransitionTrace::new(2);
/// for (from, to) in [("A", "B"), ("B", "C"), ("C", "D")] {
///     trace.record(TransitionRecord {
///         from: from.to_string(),
///         event: "next".to_string(),
///         to: to.to_string(),
///         timestamp: Utc::now(),
///         cascade_depth: 0,
///     });
/// }
///
/// assert_eq!(trace.get_path(), vec!["B", "C", "D"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionTrace {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl TransitionTrace {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// States traversed: the source of the oldest retained record, then the
    /// target of each record.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the oldest and the newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
