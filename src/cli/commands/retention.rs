//! `remove-old-donations` command
//!
//! Anonymizes donors whose forms are older than the retention period.

use crate::anonymization::retention::{effective_dry_run, AgeUnit, RetentionPolicy, RetentionSweep};
use crate::cli::commands::context::{finish, load_validated, JobContext};
use crate::cli::exit_code;
use chrono::Utc;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the remove-old-donations command
#[derive(Args, Debug)]
pub struct RetentionArgs {
    /// Unit of --age (years, months, weeks, days; hours, minutes, seconds outside production)
    #[arg(long)]
    pub age_unit: Option<AgeUnit>,

    /// Retention period in --age-unit units
    #[arg(long)]
    pub age: Option<u32>,

    /// Donors per anonymization job (defaults to retention.batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Count due donors without anonymizing
    #[arg(long)]
    pub dry_run: bool,
}

impl RetentionArgs {
    /// Apply command line overrides to the configured policy
    pub fn policy(&self, configured: RetentionPolicy) -> RetentionPolicy {
        RetentionPolicy::new(
            self.age_unit.unwrap_or(configured.unit),
            self.age.unwrap_or(configured.age),
        )
    }

    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };

        let policy = self.policy(RetentionPolicy::from_config(&config.retention));
        if policy.age == 0 || !policy.unit.allowed_in(config.environment) {
            eprintln!(
                "Retention period '{policy}' is not allowed in {:?}",
                config.environment
            );
            return Ok(exit_code::CONFIGURATION);
        }

        let requested = self.dry_run || config.application.dry_run;
        let dry_run = effective_dry_run(config.environment, &policy, requested);
        if dry_run && !requested {
            tracing::warn!(policy = %policy, "Non-default retention period in production, forcing dry run");
            println!("⚠️  Non-default retention period in production: counting only");
        }

        let context = match JobContext::connect(config).await {
            Ok(context) => context,
            Err(code) => return Ok(code),
        };
        let batch_size = self.batch_size.unwrap_or(context.config.retention.batch_size);

        println!("🧹 Removing personal data of donors older than {policy}...");

        let scheduled = RetentionSweep::new(
            context.store.clone(),
            context.dispatcher.clone(),
            policy,
            batch_size,
        )
        .with_shutdown(shutdown_signal)
        .dry_run(dry_run)
        .run(Utc::now())
        .await;

        Ok(finish(context.dispatcher.as_ref(), scheduled).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_and_override_policy() {
        let cli = Cli::parse_from([
            "donorvault",
            "remove-old-donations",
            "--age-unit",
            "months",
            "--age",
            "18",
        ]);
        let Commands::RemoveOldDonations(args) = cli.command else {
            panic!("expected remove-old-donations");
        };
        let policy = args.policy(RetentionPolicy::default());
        assert_eq!(policy, RetentionPolicy::new(AgeUnit::Months, 18));
    }

    #[test]
    fn test_defaults_keep_configured_policy() {
        let cli = Cli::parse_from(["donorvault", "remove-old-donations"]);
        let Commands::RemoveOldDonations(args) = cli.command else {
            panic!("expected remove-old-donations");
        };
        assert!(args.policy(RetentionPolicy::default()).is_default());
    }
}
