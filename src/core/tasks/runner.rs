//! Executes jobs against the shared store and codecs

use crate::adapters::database::DonorStore;
use crate::anonymization::AnonymizationEngine;
use crate::codec::DonorCodecs;
use crate::core::batch::BatchResult;
use crate::core::repair::repair_batch;
use crate::core::rotation::rotate_batch;
use crate::core::tasks::Job;
use crate::domain::Result;
use std::sync::Arc;

/// Runs one [`Job`] to completion
///
/// Shared by every worker; holds only `Arc`s and immutable codecs.
pub struct JobRunner {
    store: Arc<dyn DonorStore>,
    codecs: DonorCodecs,
    engine: Arc<AnonymizationEngine>,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn DonorStore>,
        codecs: DonorCodecs,
        engine: Arc<AnonymizationEngine>,
    ) -> Self {
        Self {
            store,
            codecs,
            engine,
        }
    }

    /// Run a job
    ///
    /// # Errors
    ///
    /// Returns an error only when the batch itself cannot be loaded; failures
    /// of single donors are counted in the [`BatchResult`].
    pub async fn run(&self, job: &Job) -> Result<BatchResult> {
        tracing::debug!(job = job.kind(), batch_size = job.len(), "Running job");

        match job {
            Job::RepairAddresses(ids) => {
                repair_batch(self.store.as_ref(), &self.codecs.address, ids).await
            }
            Job::RotateKeys(ids) => rotate_batch(self.store.as_ref(), self.codecs.cipher(), ids).await,
            Job::AnonymizeDonors(ids) => Ok(self.engine.anonymize_batch(ids).await),
        }
    }
}
