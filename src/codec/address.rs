//! Canonical address serialization
//!
//! Addresses are written as `v2:` followed by a JSON object with exactly the
//! six [`Address`] keys. The tag lets readers tell canonical payloads apart
//! from the untagged dictionary literals written by the legacy serializer,
//! which the repair job converts (see [`super::legacy`]).

use super::cipher::FieldCipher;
use super::legacy::parse_legacy_address;
use crate::domain::errors::{AddressFormatError, VaultError};
use crate::domain::{Address, Result};
use std::sync::Arc;

/// Version tag of the canonical format
pub const CANONICAL_VERSION: &str = "v2";

/// Serialize an address in the canonical format
pub fn to_canonical(address: &Address) -> Result<String> {
    let body = serde_json::to_string(address)?;
    Ok(format!("{CANONICAL_VERSION}:{body}"))
}

/// Parse a canonical payload
///
/// # Errors
///
/// - [`AddressFormatError::Untagged`] when the payload has no version tag
/// - [`AddressFormatError::UnsupportedVersion`] for a tag other than `v2`
/// - [`AddressFormatError::InvalidPayload`] when the body is not the six-key object
pub fn from_canonical(plaintext: &str) -> std::result::Result<Address, AddressFormatError> {
    let (tag, body) = match plaintext.split_once(':') {
        Some((tag, body)) if is_version_tag(tag) => (tag, body),
        _ => return Err(AddressFormatError::Untagged),
    };

    if tag != CANONICAL_VERSION {
        return Err(AddressFormatError::UnsupportedVersion(tag.to_string()));
    }

    serde_json::from_str(body).map_err(|e| AddressFormatError::InvalidPayload(e.to_string()))
}

fn is_version_tag(tag: &str) -> bool {
    tag.strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// How a decrypted address payload was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAddress {
    /// Payload already in the canonical format
    Canonical(Address),
    /// Payload was a legacy literal and should be rewritten
    Legacy(Address),
}

impl DecodedAddress {
    /// The address regardless of source format
    pub fn into_address(self) -> Address {
        match self {
            DecodedAddress::Canonical(address) | DecodedAddress::Legacy(address) => address,
        }
    }

    /// True when the stored payload needs rewriting
    pub fn is_legacy(&self) -> bool {
        matches!(self, DecodedAddress::Legacy(_))
    }
}

/// Encrypts and decrypts the address field
#[derive(Debug, Clone)]
pub struct AddressCodec {
    cipher: Arc<FieldCipher>,
}

impl AddressCodec {
    pub fn new(cipher: Arc<FieldCipher>) -> Self {
        Self { cipher }
    }

    /// Underlying cipher
    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// Encrypt an address in the canonical format
    pub fn encrypt(&self, address: &Address) -> Result<String> {
        let plaintext = to_canonical(address)?;
        Ok(self.cipher.encrypt(plaintext.as_bytes())?)
    }

    /// Decrypt a stored address, requiring the canonical format
    ///
    /// An empty stored value means no address was provided.
    pub fn decrypt(&self, token: &str) -> Result<Option<Address>> {
        if token.is_empty() {
            return Ok(None);
        }
        let plaintext = self.cipher.decrypt_to_string(token)?;
        Ok(Some(from_canonical(&plaintext)?))
    }

    /// Decrypt a stored address, accepting legacy literals
    ///
    /// Used by the repair job; callers learn from the result whether the
    /// value must be rewritten.
    pub fn decrypt_any(&self, token: &str) -> Result<Option<DecodedAddress>> {
        if token.is_empty() {
            return Ok(None);
        }
        let plaintext = self.cipher.decrypt_to_string(token)?;
        match from_canonical(&plaintext) {
            Ok(address) => Ok(Some(DecodedAddress::Canonical(address))),
            Err(AddressFormatError::Untagged) => {
                let address = parse_legacy_address(&plaintext).map_err(VaultError::from)?;
                Ok(Some(DecodedAddress::Legacy(address)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
