//! Scheduling and run summaries

use crate::core::batch::BatchResult;
use crate::domain::DonorId;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of enumerating donors and dispatching batches
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    /// Identifier correlating the log lines of one run
    pub run_id: Uuid,
    /// Job kind, e.g. `repair_addresses`
    pub job: &'static str,
    /// Number of batches handed to the dispatcher
    pub batches_dispatched: usize,
    /// Size of every dispatched batch, in dispatch order
    pub batch_sizes: Vec<usize>,
    /// Donors matched by the enumeration
    pub records_matched: usize,
    /// Last key enumerated; pass as `start_after` to resume
    pub last_key: Option<DonorId>,
    /// Enumeration stopped early on the shutdown signal
    pub interrupted: bool,
    /// Donors were only counted
    pub dry_run: bool,
    /// Wall time spent enumerating and dispatching
    pub duration: Duration,
}

impl ScheduleSummary {
    pub fn new(job: &'static str, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            job,
            batches_dispatched: 0,
            batch_sizes: Vec::new(),
            records_matched: 0,
            last_key: None,
            interrupted: false,
            dry_run,
            duration: Duration::ZERO,
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            job = self.job,
            batches = self.batches_dispatched,
            records = self.records_matched,
            last_key = ?self.last_key.map(DonorId::get),
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Scheduling completed"
        );
    }
}

/// Outcome of waiting for all dispatched jobs
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrainSummary {
    /// Jobs that ran to completion
    pub jobs_completed: usize,
    /// Jobs that returned an error or panicked
    pub jobs_failed: usize,
    /// Record counters merged over all completed jobs
    pub records: BatchResult,
    /// One message per failed job
    pub job_errors: Vec<String>,
}

impl DrainSummary {
    pub fn record_success(&mut self, result: BatchResult) {
        self.jobs_completed += 1;
        self.records.merge(result);
    }

    pub fn record_failure(&mut self, message: String) {
        self.jobs_failed += 1;
        self.job_errors.push(message);
    }

    pub fn merge(&mut self, other: DrainSummary) {
        self.jobs_completed += other.jobs_completed;
        self.jobs_failed += other.jobs_failed;
        self.records.merge(other.records);
        self.job_errors.extend(other.job_errors);
    }

    /// True when every job ran and no record failed
    pub fn is_successful(&self) -> bool {
        self.jobs_failed == 0 && self.records.failed == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            jobs_completed = self.jobs_completed,
            jobs_failed = self.jobs_failed,
            processed = self.records.processed,
            updated = self.records.updated,
            skipped = self.records.skipped,
            conflicts = self.records.conflicts,
            failed = self.records.failed,
            "Jobs drained"
        );

        if !self.is_successful() {
            tracing::warn!(
                job_errors = self.job_errors.len(),
                record_errors = self.records.errors.len(),
                "Jobs completed with errors"
            );
            for error in self.job_errors.iter().chain(self.records.errors.iter()).take(10) {
                tracing::warn!(error = %error, "Job error");
            }
        }
    }
}
