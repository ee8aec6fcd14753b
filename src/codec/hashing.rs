//! Keyed identifier hashing
//!
//! Produces stable, non-reversible tokens for identifiers that must appear in
//! storage paths or audit logs without revealing the raw key.

use sha2::{Digest, Sha256};

/// Length of the hex digest returned by [`hash_id_secret`]
pub const HASH_LENGTH: usize = 32;

/// Hash an identifier together with a namespace prefix and a secret
///
/// The same inputs always give the same output; a different prefix or secret
/// gives an unrelated output.
pub fn hash_id_secret(prefix: &str, id: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(b"-");
    hasher.update(id.to_string().as_bytes());
    hasher.update(b"-");
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();

    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_LENGTH);
    hex
}
