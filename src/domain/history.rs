//! Bounded in-memory history of the latest recommendations.

use std::collections::VecDeque;

use super::record::Record;

/// Number of recommendations kept.
pub const HISTORY_CAPACITY: usize = 3;

/// Newest-first history of at most [`HISTORY_CAPACITY`] recommendations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: VecDeque<Record>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite with a server-provided list, already newest-first.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.entries = records.into_iter().take(HISTORY_CAPACITY).collect();
    }

    /// Record a new recommendation at the front, dropping the oldest.
    pub fn record(&mut self, record: Record) {
        self.entries.push_front(record);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Record> {
        self.entries.iter().cloned().collect()
    }
}
