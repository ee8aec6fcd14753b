//! In-memory donor store
//!
//! Backs the integration tests and local experiments. Applies the same
//! version check as the PostgreSQL adapter, and can inject conflicts and write
//! failures to exercise retry paths.

use crate::adapters::database::traits::{DonorStore, KeyFilter};
use crate::domain::{Donor, DonorId, Result, VaultError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Faults {
    /// Pending simulated concurrent writers, per donor
    conflicts: HashMap<DonorId, u32>,
    /// Pending failing writes, for any donor
    failing_writes: u32,
}

/// In-memory implementation of [`DonorStore`] using a BTreeMap
#[derive(Clone, Default)]
pub struct InMemoryDonorStore {
    donors: Arc<RwLock<BTreeMap<DonorId, Donor>>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryDonorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored donors
    pub async fn len(&self) -> usize {
        self.donors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.donors.read().await.is_empty()
    }

    /// Simulate `count` concurrent writers touching `id`
    ///
    /// Each of the next `count` guarded writes to the donor bumps its version
    /// first, so the write sees a conflict.
    pub async fn inject_conflicts(&self, id: DonorId, count: u32) {
        self.faults.write().await.conflicts.insert(id, count);
    }

    /// Make the next `count` guarded writes fail with a database error
    pub async fn fail_next_writes(&self, count: u32) {
        self.faults.write().await.failing_writes = count;
    }

    /// Apply `mutate` when the stored version matches, bumping the version
    async fn guarded_write<F>(&self, id: DonorId, expected_version: i64, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Donor) -> bool + Send,
    {
        let mut donors = self.donors.write().await;
        {
            let mut faults = self.faults.write().await;
            if faults.failing_writes > 0 {
                faults.failing_writes -= 1;
                return Err(VaultError::Database(format!(
                    "simulated write failure for donor {id}"
                )));
            }
            if let Some(remaining) = faults.conflicts.get_mut(&id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    if let Some(donor) = donors.get_mut(&id) {
                        donor.version += 1;
                    }
                }
            }
        }

        let Some(donor) = donors.get_mut(&id) else {
            return Ok(false);
        };
        if donor.version != expected_version {
            return Ok(false);
        }

        let mut staged = donor.clone();
        if !mutate(&mut staged) {
            return Ok(false);
        }
        staged.version += 1;
        *donor = staged;
        Ok(true)
    }
}

#[async_trait]
impl DonorStore for InMemoryDonorStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_donor(&self, donor: &Donor) -> Result<()> {
        let mut donors = self.donors.write().await;
        if donors.contains_key(&donor.id) {
            return Err(VaultError::Database(format!(
                "duplicate key value for donor {}",
                donor.id
            )));
        }
        let mut stored = donor.clone();
        stored.version = 0;
        donors.insert(donor.id, stored);
        Ok(())
    }

    async fn get_donor(&self, id: DonorId) -> Result<Option<Donor>> {
        Ok(self.donors.read().await.get(&id).cloned())
    }

    async fn donors_by_ids(&self, ids: &[DonorId]) -> Result<Vec<Donor>> {
        let donors = self.donors.read().await;
        let mut found: Vec<Donor> = ids.iter().filter_map(|id| donors.get(id).cloned()).collect();
        found.sort_by_key(|donor| donor.id);
        found.dedup_by_key(|donor| donor.id);
        Ok(found)
    }

    async fn next_keys(
        &self,
        filter: KeyFilter,
        after: Option<DonorId>,
        limit: usize,
    ) -> Result<Vec<DonorId>> {
        let donors = self.donors.read().await;
        Ok(donors
            .values()
            .filter(|donor| after.map_or(true, |last| donor.id > last))
            .filter(|donor| filter.matches(donor))
            .take(limit)
            .map(|donor| donor.id)
            .collect())
    }

    async fn update_encrypted_address(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_address: &str,
    ) -> Result<bool> {
        let value = encrypted_address.to_string();
        self.guarded_write(id, expected_version, move |donor| {
            donor.encrypted_address = value;
            true
        })
        .await
    }

    async fn update_encrypted_fields(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_national_id: &str,
        encrypted_address: &str,
    ) -> Result<bool> {
        let national_id = encrypted_national_id.to_string();
        let address = encrypted_address.to_string();
        self.guarded_write(id, expected_version, move |donor| {
            donor.encrypted_national_id = national_id;
            donor.encrypted_address = address;
            true
        })
        .await
    }

    async fn save_anonymized(&self, donor: &Donor, expected_version: i64) -> Result<bool> {
        let cleared = donor.clone();
        self.guarded_write(donor.id, expected_version, move |stored| {
            if stored.is_anonymized() {
                return false;
            }
            stored.first_name = cleared.first_name;
            stored.last_name = cleared.last_name;
            stored.initial = cleared.initial;
            stored.encrypted_national_id = cleared.encrypted_national_id;
            stored.encrypted_address = cleared.encrypted_address;
            stored.phone = cleared.phone;
            stored.email = cleared.email;
            stored.geoip = cleared.geoip;
            stored.document_file = cleared.document_file;
            stored.personal_data_removal_started_at = cleared.personal_data_removal_started_at;
            stored.personal_data_removed_at = cleared.personal_data_removed_at;
            true
        })
        .await
    }
}
