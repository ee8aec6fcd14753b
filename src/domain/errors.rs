//! Domain error types
//!
//! This module defines the error hierarchy for donorvault. The top-level
//! [`VaultError`] wraps the codec-specific errors so callers can match on the
//! precise failure while still using `?` throughout.
//! None of these types expose third-party error types.

use thiserror::Error;

/// Main donorvault error type
#[derive(Debug, Error)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encryption failures
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// Decryption failures
    #[error("Decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    /// Decrypted address payload is not in the canonical format
    #[error("Address format error: {0}")]
    AddressFormat(#[from] AddressFormatError),

    /// Legacy address payload could not be interpreted
    #[error("Legacy address error: {0}")]
    LegacyAddress(#[from] LegacyAddressError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Blob storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Task dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Concurrent modification detected by the version check
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised while producing a token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    /// Key missing or not usable as a Fernet key
    #[error("Encryption key is invalid or unavailable: {0}")]
    InvalidKey(String),

    /// Plaintext above the accepted size
    #[error("Payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Errors raised while opening a token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    /// Malformed token, wrong key, or expired token
    #[error("Token is malformed, expired, or was encrypted with a different key")]
    InvalidToken,

    /// Token opened but the plaintext is not UTF-8
    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// The decrypted address does not match the canonical format
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressFormatError {
    /// No version tag; written by the legacy serializer
    #[error("Address payload carries no format tag")]
    Untagged,

    /// Tag present but not one this build understands
    #[error("Unsupported address format version: {0}")]
    UnsupportedVersion(String),

    /// Tag is canonical but the body is not the six-field mapping
    #[error("Invalid canonical address payload: {0}")]
    InvalidPayload(String),
}

/// The legacy literal could not be interpreted as an address mapping
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LegacyAddressError {
    /// Literal is syntactically broken
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Literal parsed but is not a key-value mapping
    #[error("Legacy payload is not a mapping")]
    NotAMapping,
}

impl VaultError {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::Conflict(_) | VaultError::Database(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VaultError {
    fn from(err: toml::de::Error) -> Self {
        VaultError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_display() {
        let err = VaultError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_codec_error_conversion() {
        let err: VaultError = DecryptionError::InvalidToken.into();
        assert!(matches!(err, VaultError::Decryption(_)));

        let err: VaultError = AddressFormatError::Untagged.into();
        assert!(matches!(
            err,
            VaultError::AddressFormat(AddressFormatError::Untagged)
        ));

        let err: VaultError = EncryptionError::PayloadTooLarge { size: 10, max: 5 }.into();
        assert!(err.to_string().contains("10 bytes"));
    }

    #[test]
    fn test_legacy_error_display() {
        let err = LegacyAddressError::Syntax {
            position: 3,
            message: "unexpected character".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Syntax error at position 3: unexpected character"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(VaultError::Conflict("donor 1".to_string()).is_retryable());
        assert!(!VaultError::Validation("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: VaultError = toml_err.into();
        assert!(matches!(err, VaultError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_vault_error_implements_std_error() {
        let err = VaultError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
