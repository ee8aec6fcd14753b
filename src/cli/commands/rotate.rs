//! `rotate-key` command
//!
//! Re-encrypts tokens sealed under `encryption.previous_keys` with the primary
//! key. Run after moving the old key into `previous_keys`.

use crate::cli::commands::context::{finish, load_validated, JobContext};
use crate::core::rotation::RotationScheduler;
use crate::domain::DonorId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the rotate-key command
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Donors per job (defaults to tasks.rotation_batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Resume after this donor id
    #[arg(long, value_parser = clap::value_parser!(DonorId))]
    pub start_after: Option<DonorId>,

    /// Count donors with encrypted fields without dispatching jobs
    #[arg(long)]
    pub dry_run: bool,
}

impl RotateArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting key rotation");

        let config = match load_validated(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };

        if config.encryption.previous_keys.is_empty() {
            println!("ℹ️  No previous keys configured, nothing to rotate");
            return Ok(0);
        }

        let context = match JobContext::connect(config).await {
            Ok(context) => context,
            Err(code) => return Ok(code),
        };

        let batch_size = self
            .batch_size
            .unwrap_or(context.config.tasks.rotation_batch_size);
        let dry_run = self.dry_run || context.config.application.dry_run;

        println!(
            "🔑 Rotating {} previous key(s) in batches of {batch_size}...",
            context.config.encryption.previous_keys.len()
        );

        let scheduled = RotationScheduler::new(context.store.clone(), context.dispatcher.clone())
            .with_shutdown(shutdown_signal)
            .start_after(self.start_after)
            .dry_run(dry_run)
            .schedule_rotation(batch_size)
            .await;

        Ok(finish(context.dispatcher.as_ref(), scheduled).await)
    }
}
