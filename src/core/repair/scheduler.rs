//! Enumerates donors with an encrypted address

use crate::adapters::database::{DonorStore, KeyFilter};
use crate::core::summary::ScheduleSummary;
use crate::core::tasks::{BatchScheduler, Job, TaskDispatcher};
use crate::domain::{DonorId, Result};
use std::sync::Arc;
use tokio::sync::watch;

pub const JOB_NAME: &str = "repair_addresses";

/// Dispatches [`Job::RepairAddresses`] batches over every donor with an address
pub struct RepairScheduler {
    inner: BatchScheduler,
}

impl RepairScheduler {
    pub fn new(store: Arc<dyn DonorStore>, dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        Self {
            inner: BatchScheduler::new(store, dispatcher),
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.inner = self.inner.with_shutdown(shutdown);
        self
    }

    /// Resume an interrupted run after `key`
    pub fn start_after(mut self, key: Option<DonorId>) -> Self {
        self.inner = self.inner.start_after(key);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.inner = self.inner.dry_run(dry_run);
        self
    }

    /// Dispatch one repair job per `batch_size` donors, ascending by key
    ///
    /// # Errors
    ///
    /// Returns the first store or dispatcher error.
    pub async fn schedule_repair(&self, batch_size: usize) -> Result<ScheduleSummary> {
        self.inner
            .schedule(JOB_NAME, KeyFilter::EncryptedAddress, batch_size, Job::RepairAddresses)
            .await
    }
}
