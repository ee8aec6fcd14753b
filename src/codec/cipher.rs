//! Symmetric field cipher
//!
//! Wraps Fernet (AES-128-CBC with HMAC-SHA256, random IV, embedded timestamp).
//! The platform's 32-character secret is URL-safe base64 encoded to form the
//! Fernet key, so tokens written by earlier deployments remain readable.
//!
//! A cipher holds one primary key used for every encryption and an ordered
//! list of previous keys that are only tried on decryption. The key rotation
//! job uses [`FieldCipher::key_slot`] to find tokens that still need
//! re-encrypting.

use crate::config::EncryptionConfig;
use crate::domain::errors::{DecryptionError, EncryptionError};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use fernet::Fernet;
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::ExposeSecret;
use std::fmt;

/// Required length of the configured secret, in bytes
pub const SECRET_LENGTH: usize = 32;

/// Largest plaintext accepted by [`FieldCipher::encrypt`]
pub const MAX_PLAINTEXT_BYTES: usize = 64 * 1024;

/// Which configured key opened a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    /// The primary key
    Primary,
    /// A previous key, by position in the configured list
    Previous(usize),
}

/// Process-wide field cipher
///
/// Immutable once built; share it behind an `Arc`.
pub struct FieldCipher {
    primary: Fernet,
    previous: Vec<Fernet>,
    ttl_seconds: Option<u64>,
}

impl FieldCipher {
    /// Build a cipher from a 32-character secret
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidKey`] if the secret has the wrong length.
    pub fn from_secret(secret: &str) -> Result<Self, EncryptionError> {
        Ok(Self {
            primary: fernet_from_secret(secret)?,
            previous: Vec::new(),
            ttl_seconds: None,
        })
    }

    /// Build a cipher from the `[encryption]` configuration section
    pub fn from_config(config: &EncryptionConfig) -> Result<Self, EncryptionError> {
        let mut cipher = Self::from_secret(config.key.expose_secret().as_ref())?;
        for key in &config.previous_keys {
            cipher = cipher.with_previous_key(key.expose_secret().as_ref())?;
        }
        if let Some(ttl) = config.token_ttl_seconds {
            cipher = cipher.with_ttl(ttl);
        }
        Ok(cipher)
    }

    /// Add a key accepted for decryption only
    pub fn with_previous_key(mut self, secret: &str) -> Result<Self, EncryptionError> {
        self.previous.push(fernet_from_secret(secret)?);
        Ok(self)
    }

    /// Reject tokens older than `ttl_seconds`
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Number of previous keys configured
    pub fn previous_key_count(&self) -> usize {
        self.previous.len()
    }

    /// Encrypt `plaintext` under the primary key
    ///
    /// Output differs on every call for the same input.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, EncryptionError> {
        if plaintext.len() > MAX_PLAINTEXT_BYTES {
            return Err(EncryptionError::PayloadTooLarge {
                size: plaintext.len(),
                max: MAX_PLAINTEXT_BYTES,
            });
        }
        Ok(self.primary.encrypt(plaintext))
    }

    /// Decrypt a token with the primary key, falling back to previous keys
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, DecryptionError> {
        self.decrypt_with_slot(token).map(|(plaintext, _)| plaintext)
    }

    /// Decrypt a token and require the plaintext to be UTF-8
    pub fn decrypt_to_string(&self, token: &str) -> Result<String, DecryptionError> {
        let plaintext = self.decrypt(token)?;
        String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)
    }

    /// Report which key opens `token`
    pub fn key_slot(&self, token: &str) -> Result<KeySlot, DecryptionError> {
        self.decrypt_with_slot(token).map(|(_, slot)| slot)
    }

    /// Generate a random secret suitable for the `encryption.key` setting
    pub fn generate_secret() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Decrypt a token and report which key opened it
    pub fn decrypt_with_slot(&self, token: &str) -> Result<(Vec<u8>, KeySlot), DecryptionError> {
        if let Ok(plaintext) = self.open_with(&self.primary, token) {
            return Ok((plaintext, KeySlot::Primary));
        }
        for (index, key) in self.previous.iter().enumerate() {
            if let Ok(plaintext) = self.open_with(key, token) {
                return Ok((plaintext, KeySlot::Previous(index)));
            }
        }
        Err(DecryptionError::InvalidToken)
    }

    fn open_with(&self, key: &Fernet, token: &str) -> Result<Vec<u8>, DecryptionError> {
        let result = match self.ttl_seconds {
            Some(ttl) => key.decrypt_with_ttl(token, ttl),
            None => key.decrypt(token),
        };
        result.map_err(|_| DecryptionError::InvalidToken)
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher")
            .field("previous_keys", &self.previous.len())
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

fn fernet_from_secret(secret: &str) -> Result<Fernet, EncryptionError> {
    if secret.len() != SECRET_LENGTH {
        return Err(EncryptionError::InvalidKey(format!(
            "secret must be exactly {SECRET_LENGTH} bytes long, got {}",
            secret.len()
        )));
    }
    let encoded = URL_SAFE.encode(secret.as_bytes());
    Fernet::new(&encoded)
        .ok_or_else(|| EncryptionError::InvalidKey("secret is not a usable Fernet key".to_string()))
}
