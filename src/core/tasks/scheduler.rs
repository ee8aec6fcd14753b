//! Keyset enumeration that feeds the dispatcher

use crate::adapters::database::{DonorStore, KeyFilter};
use crate::core::summary::ScheduleSummary;
use crate::core::tasks::{Job, TaskDispatcher};
use crate::domain::{DonorId, Result, VaultError};
use crate::log_batch_dispatched;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Pages through matching donor keys and dispatches one job per page
///
/// Pages are `WHERE id > last ORDER BY id LIMIT batch_size`, so batches are
/// ascending, disjoint and at most `batch_size` long. The shutdown signal is
/// checked between pages; a page already fetched is always dispatched.
pub struct BatchScheduler {
    store: Arc<dyn DonorStore>,
    dispatcher: Arc<dyn TaskDispatcher>,
    shutdown: Option<watch::Receiver<bool>>,
    start_after: Option<DonorId>,
    dry_run: bool,
}

impl BatchScheduler {
    pub fn new(store: Arc<dyn DonorStore>, dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            shutdown: None,
            start_after: None,
            dry_run: false,
        }
    }

    /// Stop between pages once the receiver reads `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Resume after this key
    pub fn start_after(mut self, key: Option<DonorId>) -> Self {
        self.start_after = key;
        self
    }

    /// Count matching donors without dispatching
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Enumerate `filter` and dispatch `make_job(page)` for every page
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Validation`] for a zero batch size, and any error
    /// from the store or the dispatcher. Batches dispatched before the error
    /// are not recalled.
    pub async fn schedule<F>(
        &self,
        job_name: &'static str,
        filter: KeyFilter,
        batch_size: usize,
        make_job: F,
    ) -> Result<ScheduleSummary>
    where
        F: Fn(Vec<DonorId>) -> Job + Send + Sync,
    {
        if batch_size == 0 {
            return Err(VaultError::Validation(
                "batch size must be greater than zero".to_string(),
            ));
        }

        let started = Instant::now();
        let mut summary = ScheduleSummary::new(job_name, self.dry_run);
        let mut after = self.start_after;

        tracing::info!(
            run_id = %summary.run_id,
            job = job_name,
            batch_size,
            start_after = ?after.map(DonorId::get),
            dry_run = self.dry_run,
            "Scheduling batches"
        );

        loop {
            if self.shutdown_requested() {
                tracing::warn!(
                    run_id = %summary.run_id,
                    job = job_name,
                    last_key = ?after.map(DonorId::get),
                    "Shutdown requested, no further batches will be dispatched"
                );
                summary.interrupted = true;
                break;
            }

            let keys = self.store.next_keys(filter, after, batch_size).await?;
            let Some(&last) = keys.last() else {
                break;
            };
            let first = keys.first().copied();
            let page_len = keys.len();

            summary.records_matched += page_len;
            summary.last_key = Some(last);
            after = Some(last);

            if !self.dry_run {
                self.dispatcher.dispatch(make_job(keys)).await?;
                summary.batches_dispatched += 1;
                summary.batch_sizes.push(page_len);
                log_batch_dispatched!(
                    job_name,
                    summary.batches_dispatched,
                    page_len,
                    first.map(DonorId::get),
                    Some(last.get())
                );
            }

            if page_len < batch_size {
                break;
            }
        }

        summary.duration = started.elapsed();
        Ok(summary)
    }
}
