//! Wiring shared by the job commands

use crate::adapters::database::{create_donor_store, DonorStore};
use crate::adapters::storage::{local::LocalFileStorage, FileStorage};
use crate::anonymization::AnonymizationEngine;
use crate::cli::exit_code;
use crate::codec::DonorCodecs;
use crate::config::{load_config, VaultConfig};
use crate::core::summary::{DrainSummary, ScheduleSummary};
use crate::core::tasks::{create_dispatcher, JobRunner, TaskDispatcher};
use std::sync::Arc;

/// Load and validate the configuration, printing the reason on failure
pub fn load_validated(config_path: &str) -> Result<VaultConfig, i32> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return Err(exit_code::CONFIGURATION);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return Err(exit_code::CONFIGURATION);
    }

    Ok(config)
}

/// Everything a job command needs, built once per invocation
pub struct JobContext {
    pub config: VaultConfig,
    pub store: Arc<dyn DonorStore>,
    pub engine: Arc<AnonymizationEngine>,
    pub dispatcher: Arc<dyn TaskDispatcher>,
}

impl JobContext {
    /// Build codecs, connect to the database and start the dispatcher
    ///
    /// Returns the exit code to use when a step fails.
    pub async fn connect(config: VaultConfig) -> Result<Self, i32> {
        let codecs = match DonorCodecs::from_config(&config.encryption) {
            Ok(codecs) => codecs,
            Err(e) => {
                tracing::error!(error = %e, "Invalid encryption configuration");
                eprintln!("Invalid encryption configuration: {e}");
                return Err(exit_code::CONFIGURATION);
            }
        };

        let store = match create_donor_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to the donor database");
                eprintln!("Failed to connect to the donor database: {e}");
                return Err(exit_code::CONNECTION);
            }
        };

        let storage: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(config.storage.root_path.clone()));

        let engine = match AnonymizationEngine::from_config(&config, Arc::clone(&store), storage) {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                tracing::error!(error = %e, "Failed to prepare anonymization");
                eprintln!("Failed to prepare anonymization: {e}");
                return Err(exit_code::CONFIGURATION);
            }
        };

        let runner = Arc::new(JobRunner::new(
            Arc::clone(&store),
            codecs,
            Arc::clone(&engine),
        ));
        let dispatcher = create_dispatcher(&config.tasks, runner);

        tracing::info!(
            run_method = ?config.tasks.run_method,
            workers = config.tasks.workers,
            "Dispatcher ready"
        );

        Ok(Self {
            config,
            store,
            engine,
            dispatcher,
        })
    }
}

/// Drain the dispatcher, print both summaries and pick the exit code
pub async fn finish(
    dispatcher: &dyn TaskDispatcher,
    scheduled: Result<ScheduleSummary, crate::domain::VaultError>,
) -> i32 {
    let drained = dispatcher.drain().await;

    let summary = match scheduled {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Scheduling failed");
            eprintln!("Scheduling failed: {e}");
            if let Ok(drained) = &drained {
                print_drain(drained);
            }
            return exit_code::FATAL;
        }
    };

    summary.log_summary();
    print_schedule(&summary);

    let drained = match drained {
        Ok(drained) => drained,
        Err(e) => {
            tracing::error!(error = %e, "Failed to wait for dispatched jobs");
            eprintln!("Failed to wait for dispatched jobs: {e}");
            return exit_code::FATAL;
        }
    };
    drained.log_summary();
    if !summary.dry_run {
        print_drain(&drained);
    }

    if summary.interrupted {
        let resume = summary
            .last_key
            .map_or_else(|| "<none>".to_string(), |key| key.to_string());
        println!("⚠️  Interrupted. Resume with --start-after {resume}");
        exit_code::INTERRUPTED
    } else if drained.is_successful() {
        println!("✅ Completed successfully");
        exit_code::SUCCESS
    } else {
        println!("⚠️  Completed with failures");
        exit_code::PARTIAL
    }
}

fn print_schedule(summary: &ScheduleSummary) {
    println!();
    println!("📊 {} (run {})", summary.job, summary.run_id);
    if summary.dry_run {
        println!("  Dry run: {} donors would be processed", summary.records_matched);
    } else {
        println!("  Batches dispatched: {}", summary.batches_dispatched);
        println!("  Donors matched: {}", summary.records_matched);
    }
    if let Some(last) = summary.last_key {
        println!("  Last key: {last}");
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
}

fn print_drain(drained: &DrainSummary) {
    let records = &drained.records;
    println!("  Jobs completed: {}", drained.jobs_completed);
    println!("  Jobs failed: {}", drained.jobs_failed);
    println!("  Donors processed: {}", records.processed);
    println!("  Updated: {}", records.updated);
    println!("  Skipped: {}", records.skipped);
    println!("  Conflicts: {}", records.conflicts);
    println!("  Failed: {}", records.failed);

    let errors: Vec<&String> = drained
        .job_errors
        .iter()
        .chain(records.errors.iter())
        .collect();
    if !errors.is_empty() {
        println!("  Errors:");
        for error in errors.iter().take(10) {
            println!("    - {error}");
        }
        if errors.len() > 10 {
            println!("    ... and {} more", errors.len() - 10);
        }
    }
    println!();
}
