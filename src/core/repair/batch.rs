//! Repair of one batch

use crate::adapters::database::DonorStore;
use crate::codec::{AddressCodec, DecodedAddress};
use crate::core::batch::BatchResult;
use crate::domain::{Donor, DonorId, Result};
use crate::log_record_skipped;

/// Rewrite every legacy address in the batch in the canonical format
///
/// Donors are handled in ascending key order. Canonical or empty addresses are
/// skipped. A payload that cannot be decrypted or parsed is logged and left
/// exactly as stored. A version conflict is logged and skipped; the next run
/// picks the donor up again.
///
/// # Errors
///
/// Returns an error only if the batch cannot be loaded.
pub async fn repair_batch(
    store: &dyn DonorStore,
    codec: &AddressCodec,
    ids: &[DonorId],
) -> Result<BatchResult> {
    let donors = store.donors_by_ids(ids).await?;
    let mut result = BatchResult::new();
    result.processed = donors.len();

    for donor in &donors {
        repair_donor(store, codec, donor, &mut result).await;
    }

    tracing::info!(
        batch_size = ids.len(),
        repaired = result.updated,
        skipped = result.skipped,
        conflicts = result.conflicts,
        failed = result.failed,
        "Address repair batch finished"
    );

    Ok(result)
}

async fn repair_donor(
    store: &dyn DonorStore,
    codec: &AddressCodec,
    donor: &Donor,
    result: &mut BatchResult,
) {
    let address = match codec.decrypt_any(&donor.encrypted_address) {
        Ok(None) => {
            log_record_skipped!(donor.id, "no address");
            result.add_skipped();
            return;
        }
        Ok(Some(DecodedAddress::Canonical(_))) => {
            log_record_skipped!(donor.id, "already canonical");
            result.add_skipped();
            return;
        }
        Ok(Some(DecodedAddress::Legacy(address))) => address,
        Err(e) => {
            tracing::error!(donor_id = %donor.id, error = %e, "Cannot read stored address");
            result.add_failure(format!("donor {}: {}", donor.id, e));
            return;
        }
    };

    let token = match codec.encrypt(&address) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(donor_id = %donor.id, error = %e, "Cannot re-encrypt address");
            result.add_failure(format!("donor {}: {}", donor.id, e));
            return;
        }
    };

    match store
        .update_encrypted_address(donor.id, donor.version, &token)
        .await
    {
        Ok(true) => {
            tracing::debug!(donor_id = %donor.id, "Address rewritten in canonical format");
            result.add_updated();
        }
        Ok(false) => {
            tracing::warn!(donor_id = %donor.id, "Donor changed during repair, skipped");
            result.add_conflict(format!("donor {}: version changed", donor.id));
        }
        Err(e) => {
            tracing::error!(donor_id = %donor.id, error = %e, "Cannot save repaired address");
            result.add_failure(format!("donor {}: {}", donor.id, e));
        }
    }
}
