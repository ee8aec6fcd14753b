//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output for operators
//! - JSON log files with daily or hourly rotation
//! - helper macros for the batch jobs
//!
//! Only identifiers are ever logged; decrypted values never reach a log line.
//!
//! # Example
//!
//! ```no_run
//! use donorvault::logging::init_logging;
//! use donorvault::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a batch handed to the dispatcher
///
/// # Example
///
/// ```no_run
/// use donorvault::log_batch_dispatched;
///
/// log_batch_dispatched!("repair_addresses", 1, 50, Some(1), Some(50));
/// ```
#[macro_export]
macro_rules! log_batch_dispatched {
    ($job:expr, $batch:expr, $size:expr, $first:expr, $last:expr) => {
        tracing::info!(
            job = $job,
            batch = $batch,
            batch_size = $size,
            first_key = ?$first,
            last_key = ?$last,
            "Batch dispatched"
        );
    };
}

/// Log a donor left unchanged by a batch job
///
/// # Example
///
/// ```no_run
/// use donorvault::log_record_skipped;
///
/// log_record_skipped!(42, "already canonical");
/// ```
#[macro_export]
macro_rules! log_record_skipped {
    ($donor_id:expr, $reason:expr) => {
        tracing::debug!(
            donor_id = %$donor_id,
            reason = $reason,
            "Record skipped"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use donorvault::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "version conflict");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
