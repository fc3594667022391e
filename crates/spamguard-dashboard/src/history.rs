//! Per-process history of analyzed messages

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use spamguard_core::{echo_text, ClassificationResult};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 1000;

/// One analyzed message as shown in the history panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Echo-truncated input text
    pub text: String,
    pub is_spam: bool,
    pub confidence: f64,
    /// Inference time in seconds, as reported by the API
    pub prediction_time: f64,
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
}

impl HistoryEntry {
    pub fn new(text: &str, result: &ClassificationResult) -> Self {
        Self {
            text: echo_text(text),
            is_spam: result.is_spam,
            confidence: result.confidence,
            prediction_time: result.elapsed_time,
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub spam_count: usize,
    /// Percentage of entries classified as spam
    pub spam_rate: f64,
}

/// Bounded history, newest first
pub struct History {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record an entry, dropping the oldest when full
    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write();
        entries.push_front(entry);
        while entries.len() > self.capacity {
            entries.pop_back();
        }
    }

    /// Up to `limit` entries, most recent first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries.read().iter().take(limit).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.entries.read();
        let total = entries.len();
        let spam_count = entries.iter().filter(|e| e.is_spam).count();
        let spam_rate = if total == 0 {
            0.0
        } else {
            spam_count as f64 * 100.0 / total as f64
        };

        HistoryStats {
            total,
            spam_count,
            spam_rate,
        }
    }
}
