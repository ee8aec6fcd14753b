//! Integration tests for configuration loading and validation
//!
//! Tests touching environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use donorvault::codec::DonorCodecs;
use donorvault::config::{load_config, Environment, RunMethod};
use donorvault::anonymization::AgeUnit;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const KEY: &str = "0123456789abcdef0123456789abcdef";
const OLD_KEY: &str = "fedcba9876543210fedcba9876543210";

fn cleanup_env_vars() {
    for var in [
        "DONORVAULT_APPLICATION_LOG_LEVEL",
        "DONORVAULT_APPLICATION_DRY_RUN",
        "DONORVAULT_ENVIRONMENT",
        "DONORVAULT_ENCRYPTION_KEY",
        "DONORVAULT_POSTGRESQL_CONNECTION_STRING",
        "DONORVAULT_TASKS_RUN_METHOD",
        "DONORVAULT_TASKS_WORKERS",
        "DONORVAULT_RETENTION_AGE_UNIT",
        "DONORVAULT_RETENTION_AGE",
        "DONORVAULT_ANONYMIZATION_ID_HASH_SECRET",
        "TEST_DONORVAULT_KEY",
        "TEST_DATABASE_URL",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = format!(
        r#"
environment = "staging"

[application]
log_level = "debug"
dry_run = true

[encryption]
key = "{KEY}"
previous_keys = ["{OLD_KEY}"]
token_ttl_seconds = 86400

[postgresql]
connection_string = "postgresql://donorvault:pw@db.internal:5432/donors"
max_connections = 20
statement_timeout_seconds = 120
ssl_mode = "require"

[storage]
root_path = "/srv/media"

[tasks]
run_method = "sync"
workers = 8
repair_batch_size = 250
rotation_batch_size = 500

[anonymization]
max_retries = 5
id_hash_secret = "pepper"

[anonymization.audit]
enabled = true
log_path = "/var/log/donorvault/audit.jsonl"

[retention]
age_unit = "months"
age = 18
batch_size = 200

[logging]
local_enabled = false
local_path = "/tmp/donorvault"
local_rotation = "hourly"
"#
    );

    let temp_file = write_config(&toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    assert_eq!(config.encryption.key.expose_secret(), KEY);
    assert_eq!(config.encryption.previous_keys.len(), 1);
    assert_eq!(config.encryption.token_ttl_seconds, Some(86400));

    assert_eq!(config.postgresql.max_connections, 20);
    assert_eq!(config.postgresql.statement_timeout_seconds, 120);
    assert_eq!(config.postgresql.ssl_mode, "require");

    assert_eq!(config.storage.root_path, "/srv/media");

    assert_eq!(config.tasks.run_method, RunMethod::Sync);
    assert_eq!(config.tasks.workers, 8);
    assert_eq!(config.tasks.repair_batch_size, 250);
    assert_eq!(config.tasks.rotation_batch_size, 500);

    assert_eq!(config.anonymization.max_retries, 5);
    assert_eq!(config.id_hash_secret(), "pepper");

    assert_eq!(config.retention.age_unit, AgeUnit::Months);
    assert_eq!(config.retention.age, 18);
    assert_eq!(config.retention.batch_size, 200);

    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    let codecs = DonorCodecs::from_config(&config.encryption).unwrap();
    assert_eq!(codecs.cipher().previous_key_count(), 1);
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(&format!(
        r#"
[encryption]
key = "{KEY}"

[postgresql]
connection_string = "postgres://localhost/donors"
"#
    ));
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert!(config.encryption.previous_keys.is_empty());
    assert!(config.encryption.token_ttl_seconds.is_none());
    assert_eq!(config.postgresql.max_connections, 10);
    assert_eq!(config.postgresql.ssl_mode, "prefer");
    assert_eq!(config.storage.root_path, "./media");
    assert_eq!(config.tasks.run_method, RunMethod::Async);
    assert_eq!(config.tasks.workers, 4);
    assert_eq!(config.tasks.repair_batch_size, 1000);
    assert_eq!(config.anonymization.max_retries, 3);
    assert!(config.anonymization.audit.enabled);
    assert_eq!(config.retention.age_unit, AgeUnit::Years);
    assert_eq!(config.retention.age, 2);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "daily");

    // Without a dedicated secret, identifiers are hashed with the field key
    assert_eq!(config.id_hash_secret(), KEY);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_DONORVAULT_KEY", KEY);
    std::env::set_var("TEST_DATABASE_URL", "postgresql://vault@db:5432/donors");

    let temp_file = write_config(
        r#"
# key = "${NOT_SUBSTITUTED_IN_COMMENTS}"
[encryption]
key = "${TEST_DONORVAULT_KEY}"

[postgresql]
connection_string = "${TEST_DATABASE_URL}"
"#,
    );
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.encryption.key.expose_secret(), KEY);
    assert_eq!(
        config.postgresql.connection_string.expose_secret(),
        "postgresql://vault@db:5432/donors"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[encryption]
key = "${TEST_DONORVAULT_KEY}"

[postgresql]
connection_string = "${TEST_DATABASE_URL}"
"#,
    );
    let err = load_config(temp_file.path()).unwrap_err().to_string();
    assert!(err.contains("TEST_DONORVAULT_KEY"));
    assert!(err.contains("TEST_DATABASE_URL"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DONORVAULT_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("DONORVAULT_TASKS_RUN_METHOD", "sync");
    std::env::set_var("DONORVAULT_TASKS_WORKERS", "16");
    std::env::set_var("DONORVAULT_RETENTION_AGE_UNIT", "days");
    std::env::set_var("DONORVAULT_RETENTION_AGE", "30");

    let temp_file = write_config(&format!(
        r#"
[application]
log_level = "info"

[encryption]
key = "{KEY}"

[postgresql]
connection_string = "postgresql://localhost/donors"

[tasks]
workers = 2
"#
    ));
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.tasks.run_method, RunMethod::Sync);
    assert_eq!(config.tasks.workers, 16);
    assert_eq!(config.retention.age_unit, AgeUnit::Days);
    assert_eq!(config.retention.age, 30);

    cleanup_env_vars();
}

#[test]
fn test_production_requires_hash_secret() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let base = format!(
        r#"
environment = "production"

[encryption]
key = "{KEY}"

[postgresql]
connection_string = "postgresql://localhost/donors"
"#
    );
    let temp_file = write_config(&base);
    assert!(load_config(temp_file.path()).is_err());

    std::env::set_var("DONORVAULT_ANONYMIZATION_ID_HASH_SECRET", "pepper");
    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(config.id_hash_secret(), "pepper");

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        // Key of the wrong length
        r#"
[encryption]
key = "too-short"

[postgresql]
connection_string = "postgresql://localhost/donors"
"#
        .to_string(),
        // Previous key repeating the primary key
        format!(
            r#"
[encryption]
key = "{KEY}"
previous_keys = ["{KEY}"]

[postgresql]
connection_string = "postgresql://localhost/donors"
"#
        ),
        // Unsupported scheme
        format!(
            r#"
[encryption]
key = "{KEY}"

[postgresql]
connection_string = "mysql://localhost/donors"
"#
        ),
        // Unknown log level
        format!(
            r#"
[application]
log_level = "loud"

[encryption]
key = "{KEY}"

[postgresql]
connection_string = "postgresql://localhost/donors"
"#
        ),
        // Short retention unit in production
        format!(
            r#"
environment = "production"

[encryption]
key = "{KEY}"

[postgresql]
connection_string = "postgresql://localhost/donors"

[anonymization]
id_hash_secret = "pepper"

[retention]
age_unit = "minutes"
age = 5
"#
        ),
    ];

    for contents in &cases {
        let temp_file = write_config(contents);
        assert!(
            load_config(temp_file.path()).is_err(),
            "expected rejection of:\n{contents}"
        );
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/donorvault.toml");
    assert!(result.is_err());
}
