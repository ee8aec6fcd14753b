//! `remove-personal-data` command
//!
//! Anonymizes the listed donors right away, for requests made by the donors
//! themselves.

use crate::anonymization::{AnonymizationOutcome, DocumentRemoval};
use crate::cli::commands::context::{load_validated, JobContext};
use crate::cli::exit_code;
use crate::domain::DonorId;
use clap::Args;
use std::io::{self, Write};

/// Arguments for the remove-personal-data command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Donor id to anonymize; repeat for several donors
    #[arg(long = "donor-id", required = true, value_parser = clap::value_parser!(DonorId))]
    pub donor_ids: Vec<DonorId>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Report what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,
}

impl RemoveArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_validated(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        config.application.dry_run |= self.dry_run;

        if !self.yes && !config.application.dry_run {
            println!(
                "Personal data of {} donor(s) will be removed permanently.",
                self.donor_ids.len()
            );
            print!("Proceed? [y/N]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(exit_code::SUCCESS);
            }
        }

        let context = match JobContext::connect(config).await {
            Ok(context) => context,
            Err(code) => return Ok(code),
        };

        let mut failures = 0usize;
        for &donor_id in &self.donor_ids {
            match context.engine.remove_personal_data(donor_id).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => {
                    failures += 1;
                    tracing::error!(donor_id = %donor_id, error = %e, "Personal data removal failed");
                    println!("❌ Donor {donor_id}: {e}");
                }
            }
        }

        Ok(if failures == 0 {
            exit_code::SUCCESS
        } else if failures < self.donor_ids.len() {
            exit_code::PARTIAL
        } else {
            exit_code::FATAL
        })
    }
}

fn print_outcome(outcome: &AnonymizationOutcome) {
    match outcome {
        AnonymizationOutcome::Anonymized(report) => {
            let document = match &report.document {
                DocumentRemoval::NotPresent => "no signed document".to_string(),
                DocumentRemoval::Deleted => "signed document deleted".to_string(),
                DocumentRemoval::Missing => "signed document already missing".to_string(),
                DocumentRemoval::Failed(e) => format!("signed document NOT deleted: {e}"),
            };
            println!("✅ Donor {}: personal data removed ({document})", report.donor_id);
        }
        AnonymizationOutcome::AlreadyAnonymized {
            donor_id,
            removed_at,
        } => {
            println!(
                "ℹ️  Donor {donor_id}: already anonymized at {}",
                removed_at.to_rfc3339()
            );
        }
        AnonymizationOutcome::WouldAnonymize { donor_id } => {
            println!("🔍 Donor {donor_id}: would be anonymized");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_repeated_donor_ids() {
        let cli = Cli::parse_from([
            "donorvault",
            "remove-personal-data",
            "--donor-id",
            "4",
            "--donor-id",
            "9",
            "--yes",
        ]);
        let Commands::RemovePersonalData(args) = cli.command else {
            panic!("expected remove-personal-data");
        };
        let ids: Vec<i64> = args.donor_ids.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![4, 9]);
        assert!(args.yes);
    }

    #[test]
    fn test_donor_id_required() {
        assert!(Cli::try_parse_from(["donorvault", "remove-personal-data"]).is_err());
    }
}
