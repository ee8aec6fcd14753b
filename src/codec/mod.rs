//! Field encryption codec
//!
//! Everything that turns personal data into stored tokens and back:
//!
//! - [`cipher`]: the shared Fernet cipher with primary and previous keys
//! - [`address`]: the versioned canonical address format
//! - [`legacy`]: a non-evaluating reader for legacy address literals
//! - [`national_id`]: the national identifier field
//! - [`hashing`]: keyed hashing of identifiers for paths and logs

pub mod address;
pub mod cipher;
pub mod hashing;
pub mod legacy;
pub mod national_id;

pub use address::{AddressCodec, DecodedAddress, CANONICAL_VERSION};
pub use cipher::{FieldCipher, KeySlot, MAX_PLAINTEXT_BYTES};
pub use hashing::hash_id_secret;
pub use legacy::parse_legacy_address;
pub use national_id::NationalIdCodec;

use crate::config::EncryptionConfig;
use crate::domain::Result;
use std::sync::Arc;

/// The codecs for every encrypted donor field, sharing one cipher
#[derive(Debug, Clone)]
pub struct DonorCodecs {
    pub address: AddressCodec,
    pub national_id: NationalIdCodec,
}

impl DonorCodecs {
    /// Build codecs around an existing cipher
    pub fn new(cipher: Arc<FieldCipher>) -> Self {
        Self {
            address: AddressCodec::new(Arc::clone(&cipher)),
            national_id: NationalIdCodec::new(cipher),
        }
    }

    /// Build codecs from the `[encryption]` configuration section
    pub fn from_config(config: &EncryptionConfig) -> Result<Self> {
        let cipher = FieldCipher::from_config(config)?;
        Ok(Self::new(Arc::new(cipher)))
    }

    /// The shared cipher
    pub fn cipher(&self) -> &FieldCipher {
        self.address.cipher()
    }
}
