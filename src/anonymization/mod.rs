//! Personal data removal
//!
//! - [`engine`]: removes the personal data of a donor, one guarded write
//! - [`retention`]: finds donors past the retention period and queues them
//! - [`audit`]: append-only log of every removal, identifiers hashed
//! - [`report`]: outcome types
//! - [`config`]: `[anonymization]` and `[retention]` sections
//!
//! # Usage
//!
//! ```rust,ignore
//! use donorvault::anonymization::AnonymizationEngine;
//!
//! let engine = AnonymizationEngine::from_config(&config, store, storage)?;
//! let outcome = engine.remove_personal_data(donor_id).await?;
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod report;
pub mod retention;

pub use audit::AuditLogger;
pub use config::{AnonymizationConfig, AuditConfig, RetentionConfig};
pub use engine::AnonymizationEngine;
pub use report::{AnonymizationOutcome, AnonymizationReport, DocumentRemoval};
pub use retention::{effective_dry_run, AgeUnit, RetentionPolicy, RetentionSweep};
