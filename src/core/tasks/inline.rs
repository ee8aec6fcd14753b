//! Inline execution for `run_method = "sync"`

use crate::core::summary::DrainSummary;
use crate::core::tasks::{Job, JobRunner, TaskDispatcher};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs each job before `dispatch` returns
pub struct InlineDispatcher {
    runner: Arc<JobRunner>,
    summary: Mutex<DrainSummary>,
}

impl InlineDispatcher {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self {
            runner,
            summary: Mutex::new(DrainSummary::default()),
        }
    }
}

#[async_trait]
impl TaskDispatcher for InlineDispatcher {
    async fn dispatch(&self, job: Job) -> Result<()> {
        match self.runner.run(&job).await {
            Ok(result) => {
                self.summary.lock().await.record_success(result);
                Ok(())
            }
            Err(e) => {
                self.summary
                    .lock()
                    .await
                    .record_failure(format!("{} job failed: {}", job.kind(), e));
                Err(e)
            }
        }
    }

    async fn drain(&self) -> Result<DrainSummary> {
        Ok(std::mem::take(&mut *self.summary.lock().await))
    }
}
