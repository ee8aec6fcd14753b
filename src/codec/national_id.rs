//! National identifier field codec

use super::cipher::FieldCipher;
use crate::domain::Result;
use std::sync::Arc;

/// Encrypts and decrypts the national identification number
///
/// An empty value is stored as an empty string, not as a token, so records
/// without a national id stay distinguishable without decrypting.
#[derive(Debug, Clone)]
pub struct NationalIdCodec {
    cipher: Arc<FieldCipher>,
}

impl NationalIdCodec {
    pub fn new(cipher: Arc<FieldCipher>) -> Self {
        Self { cipher }
    }

    /// Encrypt a national id; empty input yields an empty stored value
    pub fn encrypt(&self, national_id: &str) -> Result<String> {
        if national_id.is_empty() {
            return Ok(String::new());
        }
        Ok(self.cipher.encrypt(national_id.as_bytes())?)
    }

    /// Decrypt a stored national id; an empty stored value reads back as empty
    pub fn decrypt(&self, stored: &str) -> Result<String> {
        if stored.is_empty() {
            return Ok(String::new());
        }
        Ok(self.cipher.decrypt_to_string(stored)?)
    }
}
