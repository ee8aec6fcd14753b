//! Rotation of one batch

use crate::adapters::database::DonorStore;
use crate::codec::{FieldCipher, KeySlot};
use crate::core::batch::BatchResult;
use crate::domain::{Donor, DonorId, Result};
use crate::log_record_skipped;

enum FieldRotation {
    Current,
    Rotated(String),
    Unreadable(String),
}

fn rotate_field(cipher: &FieldCipher, token: &str) -> FieldRotation {
    if token.is_empty() {
        return FieldRotation::Current;
    }
    match cipher.decrypt_with_slot(token) {
        Ok((_, KeySlot::Primary)) => FieldRotation::Current,
        Ok((plaintext, KeySlot::Previous(_))) => match cipher.encrypt(&plaintext) {
            Ok(rotated) => FieldRotation::Rotated(rotated),
            Err(e) => FieldRotation::Unreadable(e.to_string()),
        },
        Err(e) => FieldRotation::Unreadable(e.to_string()),
    }
}

/// Re-encrypt every field of the batch still sealed under a previous key
///
/// Plaintext is carried over byte for byte, so legacy addresses stay legacy
/// and are left to the repair job. Fields that no configured key opens are
/// logged and kept; a readable sibling field is still rotated.
///
/// # Errors
///
/// Returns an error only if the batch cannot be loaded.
pub async fn rotate_batch(
    store: &dyn DonorStore,
    cipher: &FieldCipher,
    ids: &[DonorId],
) -> Result<BatchResult> {
    let donors = store.donors_by_ids(ids).await?;
    let mut result = BatchResult::new();
    result.processed = donors.len();

    for donor in &donors {
        rotate_donor(store, cipher, donor, &mut result).await;
    }

    tracing::info!(
        batch_size = ids.len(),
        rotated = result.updated,
        skipped = result.skipped,
        conflicts = result.conflicts,
        failed = result.failed,
        "Key rotation batch finished"
    );

    Ok(result)
}

async fn rotate_donor(
    store: &dyn DonorStore,
    cipher: &FieldCipher,
    donor: &Donor,
    result: &mut BatchResult,
) {
    let fields = [
        ("national_id", &donor.encrypted_national_id),
        ("address", &donor.encrypted_address),
    ];

    let mut rotated: [Option<String>; 2] = [None, None];
    let mut unreadable = false;

    for (slot, (field, token)) in rotated.iter_mut().zip(fields) {
        match rotate_field(cipher, token) {
            FieldRotation::Current => {}
            FieldRotation::Rotated(new_token) => *slot = Some(new_token),
            FieldRotation::Unreadable(error) => {
                tracing::error!(
                    donor_id = %donor.id,
                    field,
                    error = %error,
                    "No configured key opens the stored token"
                );
                result.add_failure(format!("donor {} {}: {}", donor.id, field, error));
                unreadable = true;
            }
        }
    }

    let [national_id, address] = rotated;
    if national_id.is_none() && address.is_none() {
        if !unreadable {
            log_record_skipped!(donor.id, "already under the primary key");
            result.add_skipped();
        }
        return;
    }

    let national_id = national_id.unwrap_or_else(|| donor.encrypted_national_id.clone());
    let address = address.unwrap_or_else(|| donor.encrypted_address.clone());

    match store
        .update_encrypted_fields(donor.id, donor.version, &national_id, &address)
        .await
    {
        Ok(true) => result.add_updated(),
        Ok(false) => {
            tracing::warn!(donor_id = %donor.id, "Donor changed during rotation, skipped");
            result.add_conflict(format!("donor {}: version changed", donor.id));
        }
        Err(e) => {
            tracing::error!(donor_id = %donor.id, error = %e, "Cannot save rotated fields");
            result.add_failure(format!("donor {}: {}", donor.id, e));
        }
    }
}
