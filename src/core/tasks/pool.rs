//! Bounded worker pool for `run_method = "async"`

use crate::core::batch::BatchResult;
use crate::core::summary::DrainSummary;
use crate::core::tasks::{Job, JobRunner, TaskDispatcher};
use crate::domain::{Result, VaultError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinError, JoinSet};

type JobOutcome = (&'static str, Result<BatchResult>);

/// Spawns each job as a tokio task, at most `workers` at a time
///
/// `dispatch` waits for a free worker, so a fast scheduler cannot queue an
/// unbounded number of batches. Jobs may finish in any order.
pub struct WorkerPoolDispatcher {
    runner: Arc<JobRunner>,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<JobOutcome>>,
    finished: Mutex<DrainSummary>,
}

impl WorkerPoolDispatcher {
    pub fn new(runner: Arc<JobRunner>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            runner,
            permits: Arc::new(Semaphore::new(workers)),
            tasks: Mutex::new(JoinSet::new()),
            finished: Mutex::new(DrainSummary::default()),
        }
    }

    /// Collect jobs that already finished without waiting for the rest
    async fn reap(&self) {
        let mut tasks = self.tasks.lock().await;
        let mut finished = self.finished.lock().await;
        while let Some(joined) = tasks.try_join_next() {
            record(&mut finished, joined);
        }
    }
}

fn record(summary: &mut DrainSummary, joined: std::result::Result<JobOutcome, JoinError>) {
    match joined {
        Ok((_, Ok(result))) => summary.record_success(result),
        Ok((kind, Err(e))) => {
            tracing::error!(job = kind, error = %e, "Job failed");
            summary.record_failure(format!("{kind} job failed: {e}"));
        }
        Err(e) => {
            tracing::error!(error = %e, "Job task aborted");
            summary.record_failure(format!("job task aborted: {e}"));
        }
    }
}

#[async_trait]
impl TaskDispatcher for WorkerPoolDispatcher {
    async fn dispatch(&self, job: Job) -> Result<()> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| VaultError::Dispatch(format!("worker pool closed: {e}")))?;

        self.reap().await;

        let runner = Arc::clone(&self.runner);
        self.tasks.lock().await.spawn(async move {
            let _permit = permit;
            let outcome = runner.run(&job).await;
            (job.kind(), outcome)
        });

        Ok(())
    }

    async fn drain(&self) -> Result<DrainSummary> {
        let mut tasks = self.tasks.lock().await;
        let mut finished = self.finished.lock().await;
        while let Some(joined) = tasks.join_next().await {
            record(&mut finished, joined);
        }
        Ok(std::mem::take(&mut *finished))
    }
}
