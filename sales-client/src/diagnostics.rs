//! Submission diagnostics
//!
//! Bounded in-memory log of remote calls, most recent first. Operator
//! debugging only: nothing reads it to make decisions.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Outcome of one remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptOutcome {
    Success,
    Timeout,
    NetworkError,
    Rejected,
}

/// One logged remote call
#[derive(Debug, Clone, Serialize)]
pub struct AttemptEntry {
    /// Epoch millis when the call finished
    pub at: i64,
    pub method: String,
    pub endpoint: String,
    pub outcome: AttemptOutcome,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub detail: Option<String>,
}

/// Ring buffer of recent attempts
#[derive(Debug)]
pub struct SubmissionLog {
    entries: Mutex<VecDeque<AttemptEntry>>,
    capacity: usize,
}

impl SubmissionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record an attempt, evicting the oldest entry when full
    pub fn record(&self, entry: AttemptEntry) {
        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Copy of the log, most recent first
    pub fn entries(&self) -> Vec<AttemptEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: i64) -> AttemptEntry {
        AttemptEntry {
            at: n,
            method: "POST".to_string(),
            endpoint: "/orders".to_string(),
            outcome: AttemptOutcome::Success,
            status: Some(201),
            elapsed_ms: 12,
            detail: None,
        }
    }

    #[test]
    fn test_most_recent_first() {
        let log = SubmissionLog::new(10);
        log.record(entry(1));
        log.record(entry(2));
        log.record(entry(3));

        let at: Vec<i64> = log.entries().iter().map(|e| e.at).collect();
        assert_eq!(at, vec![3, 2, 1]);
    }

    #[test]
    fn test_bounded() {
        let log = SubmissionLog::new(3);
        for n in 0..10 {
            log.record(entry(n));
        }
        assert_eq!(log.len(), 3);
        let at: Vec<i64> = log.entries().iter().map(|e| e.at).collect();
        assert_eq!(at, vec![9, 8, 7]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let log = SubmissionLog::new(0);
        log.record(entry(1));
        log.record(entry(2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].at, 2);
    }
}
