//! Audit logger for anonymization operations

use crate::anonymization::config::AuditConfig;
use crate::anonymization::report::AnonymizationReport;
use crate::codec::hash_id_secret;
use crate::config::{secret_string, SecretString};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Audit log entry
///
/// The donor is identified by a keyed hash only.
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    donor_hash: String,
    cause_id: Option<i64>,
    personal_data_removal_started_at: String,
    personal_data_removed_at: String,
    document_removed: bool,
    attempts: u32,
}

/// Appends one line per anonymized donor
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    hash_secret: SecretString,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(
        log_path: PathBuf,
        json_format: bool,
        enabled: bool,
        hash_secret: SecretString,
    ) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            hash_secret,
            write_lock: Mutex::new(()),
        })
    }

    /// Create a logger from the `[anonymization.audit]` section
    pub fn from_config(config: &AuditConfig, hash_secret: &str) -> Result<Self> {
        Self::new(
            config.log_path.clone(),
            config.json_format,
            config.enabled,
            secret_string(hash_secret.to_string()),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a committed anonymization
    pub fn log_anonymization(&self, report: &AnonymizationReport) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            donor_hash: hash_id_secret(
                "donor",
                report.donor_id.get(),
                self.hash_secret.expose_secret().as_ref(),
            ),
            cause_id: report.cause_id.map(|id| id.get()),
            personal_data_removal_started_at: report.started_at.to_rfc3339(),
            personal_data_removed_at: report.completed_at.to_rfc3339(),
            document_removed: report.document.removed(),
            attempts: report.attempts,
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let line = if self.json_format {
            serde_json::to_string(entry).context("Failed to serialize audit entry")?
        } else {
            format!(
                "[{}] Donor: {} | Cause: {} | Removed at: {} | Document removed: {}",
                entry.timestamp,
                entry.donor_hash,
                entry
                    .cause_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
                entry.personal_data_removed_at,
                entry.document_removed
            )
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Audit log lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        file.write_all(format!("{line}\n").as_bytes())
            .context("Failed to write audit entry")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::report::DocumentRemoval;
    use crate::domain::{CauseId, DonorId};
    use chrono::Utc;
    use tempfile::tempdir;

    fn report() -> AnonymizationReport {
        let now = Utc::now();
        AnonymizationReport {
            donor_id: DonorId::new(1234).unwrap(),
            cause_id: Some(CauseId::new(7).unwrap()),
            started_at: now,
            completed_at: now,
            attempts: 1,
            document: DocumentRemoval::Deleted,
        }
    }

    #[test]
    fn test_json_entry_hashes_donor() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("anonymization.jsonl");
        let logger =
            AuditLogger::new(log_path.clone(), true, true, secret_string("pepper".into())).unwrap();

        logger.log_anonymization(&report()).unwrap();
        logger.log_anonymization(&report()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["cause_id"], 7);
        assert_eq!(entry["document_removed"], true);
        assert_eq!(
            entry["donor_hash"],
            hash_id_secret("donor", 1234, "pepper")
        );
        assert!(!content.contains("\"1234\""));
    }

    #[test]
    fn test_plain_text_entry() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger =
            AuditLogger::new(log_path.clone(), false, true, secret_string("pepper".into())).unwrap();

        logger.log_anonymization(&report()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.starts_with('['));
        assert!(content.contains("Cause: 7"));
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger =
            AuditLogger::new(log_path.clone(), true, false, secret_string("pepper".into())).unwrap();

        logger.log_anonymization(&report()).unwrap();
        assert!(!log_path.exists());
    }
}
