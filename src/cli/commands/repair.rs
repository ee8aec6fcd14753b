//! `repair-addresses` command
//!
//! Rewrites every encrypted address still stored as a legacy literal.

use crate::cli::commands::context::{finish, load_validated, JobContext};
use crate::core::repair::RepairScheduler;
use crate::domain::DonorId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the repair-addresses command
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Donors per job (defaults to tasks.repair_batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Resume after this donor id
    #[arg(long, value_parser = clap::value_parser!(DonorId))]
    pub start_after: Option<DonorId>,

    /// Count donors with an address without dispatching jobs
    #[arg(long)]
    pub dry_run: bool,
}

impl RepairArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting address repair");

        let config = match load_validated(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let context = match JobContext::connect(config).await {
            Ok(context) => context,
            Err(code) => return Ok(code),
        };

        let batch_size = self
            .batch_size
            .unwrap_or(context.config.tasks.repair_batch_size);
        let dry_run = self.dry_run || context.config.application.dry_run;

        if dry_run {
            println!("🔍 DRY RUN MODE - no address will be rewritten");
        }
        println!("🚀 Scheduling address repair in batches of {batch_size}...");

        let scheduled = RepairScheduler::new(context.store.clone(), context.dispatcher.clone())
            .with_shutdown(shutdown_signal)
            .start_after(self.start_after)
            .dry_run(dry_run)
            .schedule_repair(batch_size)
            .await;

        Ok(finish(context.dispatcher.as_ref(), scheduled).await)
    }
}
