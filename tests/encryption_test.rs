//! Integration tests for field encryption
//!
//! These tests verify that:
//! - Addresses and national ids survive an encrypt/decrypt cycle
//! - Tokens differ on every encryption of the same value
//! - Tokens only open under the key that sealed them (or a configured previous key)
//! - Stored addresses carry the canonical version tag

mod common;

use common::{codecs, fake_address, fake_national_id, KEY, OLD_KEY};
use donorvault::codec::{AddressCodec, DonorCodecs, FieldCipher, KeySlot, NationalIdCodec};
use donorvault::domain::{Address, AddressFormatError, DecryptionError, EncryptionError, VaultError};
use std::sync::Arc;

#[test]
fn test_address_roundtrip_with_generated_addresses() {
    let codecs = codecs();
    for _ in 0..25 {
        let address = fake_address();
        let token = codecs.address.encrypt(&address).unwrap();
        assert_eq!(codecs.address.decrypt(&token).unwrap(), Some(address));
    }
}

#[test]
fn test_address_roundtrip_preserves_unicode_and_quotes() {
    let codecs = codecs();
    let address = Address::new("Șoseaua Ștefan cel Mare \"Vechi\"", "12'bis")
        .with_building("Ț1")
        .with_apartment("\\3");
    let token = codecs.address.encrypt(&address).unwrap();
    assert_eq!(codecs.address.decrypt(&token).unwrap(), Some(address));
}

#[test]
fn test_national_id_roundtrip() {
    let codecs = codecs();
    for _ in 0..25 {
        let national_id = fake_national_id();
        let token = codecs.national_id.encrypt(&national_id).unwrap();
        assert_ne!(token, national_id);
        assert_eq!(codecs.national_id.decrypt(&token).unwrap(), national_id);
    }
}

#[test]
fn test_empty_values_are_stored_empty() {
    let codecs = codecs();
    assert_eq!(codecs.national_id.encrypt("").unwrap(), "");
    assert_eq!(codecs.national_id.decrypt("").unwrap(), "");
    assert_eq!(codecs.address.decrypt("").unwrap(), None);
}

#[test]
fn test_encryption_is_not_deterministic() {
    let codecs = codecs();
    let address = Address::new("Main", "5");
    let first = codecs.address.encrypt(&address).unwrap();
    let second = codecs.address.encrypt(&address).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_stored_plaintext_is_version_tagged() {
    let codecs = codecs();
    let token = codecs.address.encrypt(&Address::new("Main", "5")).unwrap();
    let plaintext = codecs.cipher().decrypt_to_string(&token).unwrap();
    assert!(plaintext.starts_with("v2:{"));
    for key in [
        "street_name",
        "street_number",
        "building",
        "entrance",
        "floor",
        "apartment",
    ] {
        assert!(plaintext.contains(key), "missing {key}");
    }
}

#[test]
fn test_wrong_key_is_rejected() {
    let token = codecs().national_id.encrypt("1800101221144").unwrap();
    let other = NationalIdCodec::new(Arc::new(FieldCipher::from_secret(OLD_KEY).unwrap()));
    let err = other.decrypt(&token).unwrap_err();
    assert!(matches!(
        err,
        VaultError::Decryption(DecryptionError::InvalidToken)
    ));
}

#[test]
fn test_malformed_token_is_rejected() {
    let err = codecs().address.decrypt("not-a-token").unwrap_err();
    assert!(matches!(err, VaultError::Decryption(_)));
}

#[test]
fn test_previous_key_still_decrypts() {
    let old = FieldCipher::from_secret(OLD_KEY).unwrap();
    let token = old.encrypt(b"1800101221144").unwrap();

    let rotated = FieldCipher::from_secret(KEY)
        .unwrap()
        .with_previous_key(OLD_KEY)
        .unwrap();
    assert_eq!(rotated.decrypt(&token).unwrap(), b"1800101221144");
    assert_eq!(rotated.key_slot(&token).unwrap(), KeySlot::Previous(0));

    let fresh = rotated.encrypt(b"1800101221144").unwrap();
    assert_eq!(rotated.key_slot(&fresh).unwrap(), KeySlot::Primary);
}

#[test]
fn test_invalid_key_length() {
    assert!(matches!(
        FieldCipher::from_secret("too short"),
        Err(EncryptionError::InvalidKey(_))
    ));
}

#[test]
fn test_untagged_payload_needs_repair() {
    let codecs = codecs();
    let legacy = codecs
        .cipher()
        .encrypt(b"{'str': 'Main', 'nr': '5'}")
        .unwrap();

    let err = codecs.address.decrypt(&legacy).unwrap_err();
    assert!(matches!(
        err,
        VaultError::AddressFormat(AddressFormatError::Untagged)
    ));

    let decoded = codecs.address.decrypt_any(&legacy).unwrap().unwrap();
    assert!(decoded.is_legacy());
    assert_eq!(decoded.into_address(), Address::new("Main", "5"));
}

#[test]
fn test_future_version_is_unsupported() {
    let codecs = codecs();
    let token = codecs.cipher().encrypt(b"v3:{}").unwrap();
    assert!(matches!(
        codecs.address.decrypt_any(&token).unwrap_err(),
        VaultError::AddressFormat(AddressFormatError::UnsupportedVersion(_))
    ));
}

#[test]
fn test_codecs_share_one_cipher() {
    let cipher = Arc::new(FieldCipher::from_secret(KEY).unwrap());
    let codecs = DonorCodecs::new(Arc::clone(&cipher));
    let standalone = AddressCodec::new(cipher);

    let token = standalone.encrypt(&Address::new("Main", "5")).unwrap();
    assert!(codecs.address.decrypt(&token).unwrap().is_some());
}
