//! Personal data removal
//!
//! [`AnonymizationEngine`] clears every personal field of a donor in one
//! version-checked write, then deletes the signed document blob and appends an
//! audit entry.
//!
//! # Ordering
//!
//! 1. Load the donor; return early if it is already anonymized
//! 2. Clear the fields in memory and set both removal markers
//! 3. Commit with `save_anonymized`; on a version conflict reload and retry
//! 4. Delete the blob that the committed record no longer references
//! 5. Append the audit entry
//!
//! The stored record never holds a start marker without a completion marker.
//!
//! # Examples
//!
//! ```no_run
//! use donorvault::adapters::memory::InMemoryDonorStore;
//! use donorvault::adapters::storage::memory::InMemoryFileStorage;
//! use donorvault::anonymization::AnonymizationEngine;
//! use donorvault::domain::DonorId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AnonymizationEngine::new(
//!     Arc::new(InMemoryDonorStore::new()),
//!     Arc::new(InMemoryFileStorage::new()),
//! )
//! .with_max_retries(5);
//!
//! let outcome = engine.remove_personal_data(DonorId::new(42)?).await?;
//! println!("anonymized: {}", outcome.is_anonymized());
//! # Ok(())
//! # }
//! ```

use crate::adapters::database::DonorStore;
use crate::adapters::storage::FileStorage;
use crate::anonymization::audit::AuditLogger;
use crate::anonymization::report::{AnonymizationOutcome, AnonymizationReport, DocumentRemoval};
use crate::config::VaultConfig;
use crate::core::batch::BatchResult;
use crate::domain::{DonorId, Result, VaultError};
use crate::{log_record_skipped, log_retry_attempt};
use chrono::Utc;
use std::sync::Arc;

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Removes personal data from donor records
///
/// Cheap to share through `Arc`; every worker uses the same engine.
pub struct AnonymizationEngine {
    store: Arc<dyn DonorStore>,
    storage: Arc<dyn FileStorage>,
    audit: Option<AuditLogger>,
    max_retries: u32,
    dry_run: bool,
}

impl AnonymizationEngine {
    pub fn new(store: Arc<dyn DonorStore>, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            store,
            storage,
            audit: None,
            max_retries: DEFAULT_MAX_RETRIES,
            dry_run: false,
        }
    }

    /// Build an engine from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Configuration`] if the audit log cannot be prepared.
    pub fn from_config(
        config: &VaultConfig,
        store: Arc<dyn DonorStore>,
        storage: Arc<dyn FileStorage>,
    ) -> Result<Self> {
        let audit = &config.anonymization.audit;
        let mut engine = Self::new(store, storage)
            .with_max_retries(config.anonymization.max_retries)
            .dry_run(config.application.dry_run);

        if audit.enabled {
            let logger = AuditLogger::from_config(audit, config.id_hash_secret())
                .map_err(|e| VaultError::Configuration(format!("{e:#}")))?;
            engine = engine.with_audit(logger);
        }

        Ok(engine)
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Retries after a version conflict before giving up
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Report what would be removed without writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Irreversibly remove the personal data of one donor
    ///
    /// Idempotent: an already anonymized donor is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotFound`] if the donor does not exist
    /// - [`VaultError::Conflict`] if every attempt lost a version race
    /// - any store error; nothing was committed in that case
    pub async fn remove_personal_data(&self, donor_id: DonorId) -> Result<AnonymizationOutcome> {
        let max_attempts = self.max_retries + 1;

        for attempt in 1..=max_attempts {
            let donor = self
                .store
                .get_donor(donor_id)
                .await?
                .ok_or_else(|| VaultError::NotFound(format!("donor {donor_id}")))?;

            if let Some(removed_at) = donor.personal_data_removed_at {
                return Ok(AnonymizationOutcome::AlreadyAnonymized {
                    donor_id,
                    removed_at,
                });
            }

            if self.dry_run {
                return Ok(AnonymizationOutcome::WouldAnonymize { donor_id });
            }

            let expected_version = donor.version;
            let cause_id = donor.cause_id;
            let mut cleared = donor;

            let started_at = Utc::now();
            let completed_at = Utc::now();
            let document = cleared.clear_personal_data(started_at, completed_at);

            if self.store.save_anonymized(&cleared, expected_version).await? {
                let report = AnonymizationReport {
                    donor_id,
                    cause_id,
                    started_at,
                    completed_at,
                    attempts: attempt,
                    document: self.remove_document(donor_id, document).await,
                };
                self.record_audit(&report);

                tracing::info!(
                    donor_id = %donor_id,
                    attempts = attempt,
                    document_removed = report.document.removed(),
                    "Personal data removed"
                );
                return Ok(AnonymizationOutcome::Anonymized(report));
            }

            if attempt < max_attempts {
                log_retry_attempt!(attempt, max_attempts, "version conflict");
            }
        }

        tracing::error!(
            donor_id = %donor_id,
            attempts = max_attempts,
            "Giving up on personal data removal after repeated conflicts"
        );
        Err(VaultError::Conflict(format!(
            "donor {donor_id} changed on each of {max_attempts} attempts"
        )))
    }

    /// Anonymize every donor of a batch
    ///
    /// Failures are logged and counted; the rest of the batch still runs.
    pub async fn anonymize_batch(&self, ids: &[DonorId]) -> BatchResult {
        let mut result = BatchResult::new();
        result.processed = ids.len();

        for &donor_id in ids {
            match self.remove_personal_data(donor_id).await {
                Ok(AnonymizationOutcome::Anonymized(_)) => result.add_updated(),
                Ok(AnonymizationOutcome::AlreadyAnonymized { .. }) => {
                    log_record_skipped!(donor_id, "already anonymized");
                    result.add_skipped();
                }
                Ok(AnonymizationOutcome::WouldAnonymize { .. }) => {
                    log_record_skipped!(donor_id, "dry run");
                    result.add_skipped();
                }
                Err(VaultError::NotFound(_)) => {
                    log_record_skipped!(donor_id, "deleted before anonymization");
                    result.add_skipped();
                }
                Err(e @ VaultError::Conflict(_)) => {
                    result.add_conflict(format!("donor {donor_id}: {e}"));
                }
                Err(e) => {
                    tracing::error!(donor_id = %donor_id, error = %e, "Personal data removal failed");
                    result.add_failure(format!("donor {donor_id}: {e}"));
                }
            }
        }

        tracing::info!(
            batch_size = ids.len(),
            anonymized = result.updated,
            skipped = result.skipped,
            conflicts = result.conflicts,
            failed = result.failed,
            "Anonymization batch finished"
        );

        result
    }

    async fn remove_document(&self, donor_id: DonorId, document: Option<String>) -> DocumentRemoval {
        let Some(name) = document else {
            return DocumentRemoval::NotPresent;
        };

        match self.storage.delete(&name).await {
            Ok(true) => DocumentRemoval::Deleted,
            Ok(false) => {
                tracing::warn!(donor_id = %donor_id, "Signed document was already missing");
                DocumentRemoval::Missing
            }
            Err(e) => {
                tracing::error!(
                    donor_id = %donor_id,
                    error = %e,
                    "Failed to delete signed document; the reference is already removed"
                );
                DocumentRemoval::Failed(e.to_string())
            }
        }
    }

    fn record_audit(&self, report: &AnonymizationReport) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(e) = audit.log_anonymization(report) {
            tracing::error!(donor_id = %report.donor_id, error = %e, "Failed to write audit entry");
        }
    }
}
