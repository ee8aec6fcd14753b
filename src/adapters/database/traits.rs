//! Donor persistence traits
//!
//! Every mutating call is guarded by the record's `version`: the write only
//! applies when the stored version still equals `expected_version`, and it
//! bumps the version. A `false` return means another writer got there first.

use crate::domain::{Donor, DonorId, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Which donors a keyset page enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFilter {
    /// Donors with a non-empty encrypted address
    EncryptedAddress,
    /// Donors with a non-empty encrypted address or national id
    AnyEncryptedField,
    /// Donors created before the cutoff whose personal data is still present
    CreatedBefore(DateTime<Utc>),
}

impl KeyFilter {
    /// Whether `donor` belongs to the filtered set
    pub fn matches(&self, donor: &Donor) -> bool {
        match self {
            KeyFilter::EncryptedAddress => !donor.encrypted_address.is_empty(),
            KeyFilter::AnyEncryptedField => donor.has_encrypted_fields(),
            KeyFilter::CreatedBefore(cutoff) => {
                donor.created_at < *cutoff && !donor.is_anonymized()
            }
        }
    }
}

/// Storage of donor records
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// Test the database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create the donor table if it does not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert a new donor with its id and a version of zero
    async fn insert_donor(&self, donor: &Donor) -> Result<()>;

    /// Load one donor
    async fn get_donor(&self, id: DonorId) -> Result<Option<Donor>>;

    /// Load the listed donors in ascending key order; unknown ids are omitted
    async fn donors_by_ids(&self, ids: &[DonorId]) -> Result<Vec<Donor>>;

    /// Keyset page: up to `limit` matching keys greater than `after`, ascending
    ///
    /// # Arguments
    ///
    /// * `filter` - Which donors to enumerate
    /// * `after` - Last key of the previous page, `None` for the first page
    /// * `limit` - Page size
    async fn next_keys(
        &self,
        filter: KeyFilter,
        after: Option<DonorId>,
        limit: usize,
    ) -> Result<Vec<DonorId>>;

    /// Replace only the encrypted address
    async fn update_encrypted_address(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_address: &str,
    ) -> Result<bool>;

    /// Replace both encrypted fields
    async fn update_encrypted_fields(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_national_id: &str,
        encrypted_address: &str,
    ) -> Result<bool>;

    /// Persist an anonymized donor in a single write
    ///
    /// Writes every personal field and both removal markers from `donor`.
    async fn save_anonymized(&self, donor: &Donor, expected_version: i64) -> Result<bool>;
}
