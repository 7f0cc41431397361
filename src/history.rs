use crate::defaults::HISTORY_CAPACITY;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub winner_name: String,
    pub finish_time_seconds: f64,
    /// Wall-clock time of the finish, already formatted for display.
    pub timestamp: String,
}

/// Most-recent-first log of finished races plus the best time seen since the
/// last clear.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    record: Option<f64>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the head, dropping the oldest entry past capacity.
    /// Returns `true` when the entry set a new record time.
    pub fn append(&mut self, entry: HistoryEntry) -> bool {
        let is_record = self
            .record
            .map_or(true, |best| entry.finish_time_seconds < best);
        if is_record {
            self.record = Some(entry.finish_time_seconds);
        }

        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
        is_record
    }

    pub fn clear(&mut self) {
        info!("Clearing {} history entries", self.entries.len());
        self.entries.clear();
        self.record = None;
    }

    /// Fastest finish since the log was last cleared.
    pub fn record(&self) -> Option<f64> {
        self.record
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
