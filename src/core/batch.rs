//! Per-batch outcome counters
//!
//! Record-level failures inside a batch are counted here instead of aborting
//! the batch; only failures to load the batch itself are returned as errors.

use serde::Serialize;

/// Result of processing one batch of donors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Donors loaded and examined
    pub processed: usize,
    /// Donors whose record was rewritten
    pub updated: usize,
    /// Donors that needed no change
    pub skipped: usize,
    /// Donors left untouched because another writer changed them first
    pub conflicts: usize,
    /// Donors that could not be handled
    pub failed: usize,
    /// One message per conflict or failure, identifiers only
    pub errors: Vec<String>,
}

impl BatchResult {
    /// Create a new empty batch result
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_updated(&mut self) {
        self.updated += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_conflict(&mut self, message: String) {
        self.conflicts += 1;
        self.errors.push(message);
    }

    pub fn add_failure(&mut self, message: String) {
        self.failed += 1;
        self.errors.push(message);
    }

    /// Merge another batch result into this one
    pub fn merge(&mut self, other: BatchResult) {
        self.processed += other.processed;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.conflicts += other.conflicts;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }

    /// True when no record failed or conflicted
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.conflicts == 0
    }
}
