//! Shared per-run state: the result store and the progress counter

use crate::models::ProbeOutcome;
use crate::report::Report;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Included outcomes grouped by status code
#[derive(Debug, Default)]
pub struct ResultStore {
    groups: Mutex<HashMap<u16, Vec<ProbeOutcome>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one outcome under its status code.
    ///
    /// The lock is held for the push only.
    pub fn record(&self, outcome: ProbeOutcome) {
        // append-only map, a panicked writer cannot leave it half-updated
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        groups.entry(outcome.status).or_default().push(outcome);
    }

    /// Number of recorded outcomes across all status codes
    pub fn len(&self) -> usize {
        let groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the store into a sorted report; call once every writer is done
    pub fn freeze(&self, show_method: bool) -> Report {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        Report::from_groups(std::mem::take(&mut *groups), show_method)
    }
}

/// Completed-probe counter for progress reporting
#[derive(Debug)]
pub struct Progress {
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Counts one finished probe and returns the new completed count
    pub fn complete_one(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Percentage for a given completed count
    pub fn percentage(&self, completed: usize) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        completed as f64 / self.total as f64 * 100.0
    }
}
