//! Anonymization and retention configuration

use crate::anonymization::retention::AgeUnit;
use crate::config::{secret_string, Environment, SecretString};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[anonymization]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Attempts after a version conflict before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Secret for hashing identifiers in document paths and the audit log
    #[serde(default)]
    pub id_hash_secret: Option<SecretString>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            id_hash_secret: None,
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self, environment: Environment) -> Result<()> {
        if self.max_retries > 10 {
            anyhow::bail!(
                "anonymization.max_retries must be <= 10, got {}",
                self.max_retries
            );
        }

        if environment.is_production() && self.id_hash_secret.is_none() {
            anyhow::bail!("anonymization.id_hash_secret is required in production");
        }

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DONORVAULT_ANONYMIZATION_MAX_RETRIES") {
            self.max_retries = val
                .parse()
                .context("Invalid DONORVAULT_ANONYMIZATION_MAX_RETRIES value")?;
        }

        if let Ok(val) = std::env::var("DONORVAULT_ANONYMIZATION_ID_HASH_SECRET") {
            self.id_hash_secret = Some(secret_string(val));
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// `[anonymization.audit]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// One JSON object per line instead of plain text
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("anonymization.audit.log_path cannot be empty when auditing is enabled");
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DONORVAULT_ANONYMIZATION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid DONORVAULT_ANONYMIZATION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("DONORVAULT_ANONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        Ok(())
    }
}

/// `[retention]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Unit of `age`
    #[serde(default)]
    pub age_unit: AgeUnit,

    /// Donors older than this are anonymized by the sweep
    #[serde(default = "default_retention_age")]
    pub age: u32,

    /// Donors per anonymization job
    #[serde(default = "default_retention_batch_size")]
    pub batch_size: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            age_unit: AgeUnit::default(),
            age: default_retention_age(),
            batch_size: default_retention_batch_size(),
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self, environment: Environment) -> Result<()> {
        if self.age == 0 {
            anyhow::bail!("retention.age must be > 0");
        }

        if !self.age_unit.allowed_in(environment) {
            anyhow::bail!(
                "retention.age_unit '{}' is not allowed in {:?}",
                self.age_unit,
                environment
            );
        }

        if !(1..=10_000).contains(&self.batch_size) {
            anyhow::bail!(
                "retention.batch_size must be between 1 and 10000, got {}",
                self.batch_size
            );
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DONORVAULT_RETENTION_AGE_UNIT") {
            self.age_unit = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid DONORVAULT_RETENTION_AGE_UNIT value")?;
        }

        if let Ok(val) = std::env::var("DONORVAULT_RETENTION_AGE") {
            self.age = val
                .parse()
                .context("Invalid DONORVAULT_RETENTION_AGE value")?;
        }

        Ok(())
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.jsonl")
}

fn default_audit_json_format() -> bool {
    true
}

fn default_retention_age() -> u32 {
    2
}

fn default_retention_batch_size() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnonymizationConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.id_hash_secret.is_none());
        assert!(config.audit.enabled);
        assert!(config.audit.json_format);
        assert!(config.validate(Environment::Development).is_ok());
    }

    #[test]
    fn test_production_requires_hash_secret() {
        let mut config = AnonymizationConfig::default();
        assert!(config.validate(Environment::Production).is_err());
        config.id_hash_secret = Some(secret_string("pepper".to_string()));
        assert!(config.validate(Environment::Production).is_ok());
    }

    #[test]
    fn test_too_many_retries() {
        let config = AnonymizationConfig {
            max_retries: 50,
            ..AnonymizationConfig::default()
        };
        assert!(config.validate(Environment::Development).is_err());
    }

    #[test]
    fn test_retention_defaults() {
        let config = RetentionConfig::default();
        assert_eq!(config.age_unit, AgeUnit::Years);
        assert_eq!(config.age, 2);
        assert_eq!(config.batch_size, 100);
        assert!(config.validate(Environment::Production).is_ok());
    }

    #[test]
    fn test_retention_short_units_outside_production_only() {
        let config = RetentionConfig {
            age_unit: AgeUnit::Minutes,
            ..RetentionConfig::default()
        };
        assert!(config.validate(Environment::Staging).is_ok());
        assert!(config.validate(Environment::Production).is_err());
    }

    #[test]
    fn test_retention_zero_age() {
        let config = RetentionConfig {
            age: 0,
            ..RetentionConfig::default()
        };
        assert!(config.validate(Environment::Development).is_err());
    }
}
