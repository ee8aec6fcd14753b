//! Background job dispatch
//!
//! A [`Job`] is a plain value naming a batch of donors and the work to do on
//! them. A [`TaskDispatcher`] decides where it runs: inline on the caller's
//! task ([`InlineDispatcher`]) or on a bounded pool of tokio workers
//! ([`WorkerPoolDispatcher`]). Every job is idempotent, so running one twice
//! is harmless.

pub mod inline;
pub mod pool;
pub mod runner;
pub mod scheduler;

pub use inline::InlineDispatcher;
pub use pool::WorkerPoolDispatcher;
pub use runner::JobRunner;
pub use scheduler::BatchScheduler;

use crate::config::{RunMethod, TasksConfig};
use crate::core::summary::DrainSummary;
use crate::domain::{DonorId, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// A unit of background work over a batch of donors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Rewrite legacy encrypted addresses in the canonical format
    RepairAddresses(Vec<DonorId>),
    /// Re-encrypt fields still sealed under a previous key
    RotateKeys(Vec<DonorId>),
    /// Remove personal data
    AnonymizeDonors(Vec<DonorId>),
}

impl Job {
    /// Short name used in logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Job::RepairAddresses(_) => "repair_addresses",
            Job::RotateKeys(_) => "rotate_keys",
            Job::AnonymizeDonors(_) => "anonymize_donors",
        }
    }

    /// Donors in the batch, ascending
    pub fn donor_ids(&self) -> &[DonorId] {
        match self {
            Job::RepairAddresses(ids) | Job::RotateKeys(ids) | Job::AnonymizeDonors(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.donor_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.donor_ids().is_empty()
    }
}

/// Where dispatched jobs run
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Hand a job over for execution
    ///
    /// # Errors
    ///
    /// Returns an error when the job cannot be accepted. Inline dispatchers
    /// also return the job's own error.
    async fn dispatch(&self, job: Job) -> Result<()>;

    /// Wait for every dispatched job and report what they did
    async fn drain(&self) -> Result<DrainSummary>;
}

/// Build the dispatcher selected by `tasks.run_method`
pub fn create_dispatcher(config: &TasksConfig, runner: Arc<JobRunner>) -> Arc<dyn TaskDispatcher> {
    match config.run_method {
        RunMethod::Sync => Arc::new(InlineDispatcher::new(runner)),
        RunMethod::Async => Arc::new(WorkerPoolDispatcher::new(runner, config.workers)),
    }
}
