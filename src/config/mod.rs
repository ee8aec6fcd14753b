//! Configuration management for donorvault.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `DONORVAULT_*`
//! environment overrides, defaults for every optional setting, and validation
//! on load.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`EncryptionConfig`] - primary and previous field keys, token TTL
//! - [`PostgreSQLConfig`] - donor database connection
//! - [`StorageConfig`] - signed document storage root
//! - [`TasksConfig`] - run method, worker count, batch sizes
//! - [`AnonymizationConfig`] - retries, identifier hashing, audit log
//! - [`RetentionConfig`] - retention period and sweep batch size
//! - [`LoggingConfig`] - local rolling log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [encryption]
//! key = "${DONORVAULT_ENCRYPTION_KEY}"
//!
//! [postgresql]
//! connection_string = "${DATABASE_URL}"
//!
//! [tasks]
//! run_method = "async"
//! workers = 4
//! repair_batch_size = 1000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use crate::anonymization::config::{AnonymizationConfig, AuditConfig, RetentionConfig};
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, EncryptionConfig, Environment, LoggingConfig, PostgreSQLConfig, RunMethod,
    StorageConfig, TasksConfig, VaultConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
