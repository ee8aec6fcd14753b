//! Enumerates donors with any encrypted field

use crate::adapters::database::{DonorStore, KeyFilter};
use crate::core::summary::ScheduleSummary;
use crate::core::tasks::{BatchScheduler, Job, TaskDispatcher};
use crate::domain::{DonorId, Result};
use std::sync::Arc;
use tokio::sync::watch;

pub const JOB_NAME: &str = "rotate_keys";

/// Dispatches [`Job::RotateKeys`] batches
pub struct RotationScheduler {
    inner: BatchScheduler,
}

impl RotationScheduler {
    pub fn new(store: Arc<dyn DonorStore>, dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        Self {
            inner: BatchScheduler::new(store, dispatcher),
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.inner = self.inner.with_shutdown(shutdown);
        self
    }

    pub fn start_after(mut self, key: Option<DonorId>) -> Self {
        self.inner = self.inner.start_after(key);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.inner = self.inner.dry_run(dry_run);
        self
    }

    pub async fn schedule_rotation(&self, batch_size: usize) -> Result<ScheduleSummary> {
        self.inner
            .schedule(JOB_NAME, KeyFilter::AnyEncryptedField, batch_size, Job::RotateKeys)
            .await
    }
}
