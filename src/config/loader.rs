//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, RunMethod, VaultConfig};
use super::secret::secret_string;
use crate::domain::errors::VaultError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`VaultConfig`]
/// 4. Applies environment variable overrides (`DONORVAULT_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`VaultError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use donorvault::config::load_config;
///
/// let config = load_config("donorvault.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VaultConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VaultError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VaultError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] but for TOML already in memory
pub fn load_config_from_str(contents: &str) -> Result<VaultConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VaultConfig = toml::from_str(&contents)
        .map_err(|e| VaultError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        VaultError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied verbatim. Every missing variable is reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VaultError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VaultError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `DONORVAULT_*` prefix
///
/// Variables follow the pattern `DONORVAULT_<SECTION>_<KEY>`, for example
/// `DONORVAULT_ENCRYPTION_KEY` or `DONORVAULT_TASKS_WORKERS`.
fn apply_env_overrides(config: &mut VaultConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("DONORVAULT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("DONORVAULT_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DONORVAULT_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(VaultError::Configuration(format!(
                    "Invalid DONORVAULT_ENVIRONMENT '{other}'"
                )))
            }
        };
    }

    // Encryption overrides
    if let Ok(val) = std::env::var("DONORVAULT_ENCRYPTION_KEY") {
        config.encryption.key = secret_string(val);
    }
    if let Ok(val) = std::env::var("DONORVAULT_ENCRYPTION_TOKEN_TTL_SECONDS") {
        if let Ok(ttl) = val.parse() {
            config.encryption.token_ttl_seconds = Some(ttl);
        }
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("DONORVAULT_POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("DONORVAULT_POSTGRESQL_MAX_CONNECTIONS") {
        if let Ok(max) = val.parse() {
            config.postgresql.max_connections = max;
        }
    }
    if let Ok(val) = std::env::var("DONORVAULT_POSTGRESQL_SSL_MODE") {
        config.postgresql.ssl_mode = val;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("DONORVAULT_STORAGE_ROOT_PATH") {
        config.storage.root_path = val;
    }

    // Task overrides
    if let Ok(val) = std::env::var("DONORVAULT_TASKS_RUN_METHOD") {
        config.tasks.run_method = match val.to_lowercase().as_str() {
            "sync" => RunMethod::Sync,
            "async" => RunMethod::Async,
            other => {
                return Err(VaultError::Configuration(format!(
                    "Invalid DONORVAULT_TASKS_RUN_METHOD '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("DONORVAULT_TASKS_WORKERS") {
        if let Ok(workers) = val.parse() {
            config.tasks.workers = workers;
        }
    }
    if let Ok(val) = std::env::var("DONORVAULT_TASKS_REPAIR_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.tasks.repair_batch_size = size;
        }
    }

    // Anonymization and retention overrides
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| VaultError::Configuration(format!("{e:#}")))?;
    config
        .retention
        .apply_env_overrides()
        .map_err(|e| VaultError::Configuration(format!("{e:#}")))?;

    // Logging overrides
    if let Ok(val) = std::env::var("DONORVAULT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("DONORVAULT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
