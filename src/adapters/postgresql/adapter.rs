//! PostgreSQL implementation of [`DonorStore`]

use crate::adapters::database::traits::{DonorStore, KeyFilter};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{donor_from_row, geoip_value, DONOR_COLUMNS};
use crate::domain::{Donor, DonorId, Result, VaultError};
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL donor store
///
/// Every update is a single statement of the form
/// `UPDATE donors SET ..., version = version + 1 WHERE id = $1 AND version = $2`.
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn page_limit(limit: usize) -> Result<i64> {
    i64::try_from(limit).map_err(|_| VaultError::Validation(format!("Page size {limit} is too large")))
}

#[async_trait]
impl DonorStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.run_migrations().await
    }

    async fn insert_donor(&self, donor: &Donor) -> Result<()> {
        let statement = r#"
            INSERT INTO donors (
                id, ngo_id, cause_id, first_name, last_name, initial,
                encrypted_cnp, encrypted_address, city, county, phone, email,
                is_anonymous, anaf_gdpr, income_type, two_years, geoip,
                pdf_file, has_signed, date_created,
                personal_data_removal_started_at, personal_data_removed_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, 0)
        "#;

        let id = donor.id.get();
        let ngo_id = donor.ngo_id.map(|n| n.get());
        let cause_id = donor.cause_id.map(|c| c.get());
        let income_type = donor.income_type.as_str();
        let geoip = geoip_value(donor);

        self.client
            .execute(
                statement,
                &[
                    &id,
                    &ngo_id,
                    &cause_id,
                    &donor.first_name,
                    &donor.last_name,
                    &donor.initial,
                    &donor.encrypted_national_id,
                    &donor.encrypted_address,
                    &donor.city,
                    &donor.county,
                    &donor.phone,
                    &donor.email,
                    &donor.is_anonymous,
                    &donor.anaf_gdpr,
                    &income_type,
                    &donor.two_years,
                    &geoip,
                    &donor.document_file,
                    &donor.has_signed,
                    &donor.created_at,
                    &donor.personal_data_removal_started_at,
                    &donor.personal_data_removed_at,
                ],
            )
            .await?;

        tracing::debug!(donor_id = %donor.id, "Inserted donor");
        Ok(())
    }

    async fn get_donor(&self, id: DonorId) -> Result<Option<Donor>> {
        let query = format!("SELECT {DONOR_COLUMNS} FROM donors WHERE id = $1");
        let rows = self.client.query(&query, &[&id.get()]).await?;
        rows.first().map(donor_from_row).transpose()
    }

    async fn donors_by_ids(&self, ids: &[DonorId]) -> Result<Vec<Donor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let query = format!("SELECT {DONOR_COLUMNS} FROM donors WHERE id = ANY($1) ORDER BY id");
        let rows = self.client.query(&query, &[&keys]).await?;
        rows.iter().map(donor_from_row).collect()
    }

    async fn next_keys(
        &self,
        filter: KeyFilter,
        after: Option<DonorId>,
        limit: usize,
    ) -> Result<Vec<DonorId>> {
        let after = after.map(DonorId::get).unwrap_or(0);
        let limit = page_limit(limit)?;

        let rows = match filter {
            KeyFilter::EncryptedAddress => {
                self.client
                    .query(
                        "SELECT id FROM donors WHERE encrypted_address <> '' AND id > $1 \
                         ORDER BY id LIMIT $2",
                        &[&after, &limit],
                    )
                    .await?
            }
            KeyFilter::AnyEncryptedField => {
                self.client
                    .query(
                        "SELECT id FROM donors \
                         WHERE (encrypted_address <> '' OR encrypted_cnp <> '') AND id > $1 \
                         ORDER BY id LIMIT $2",
                        &[&after, &limit],
                    )
                    .await?
            }
            KeyFilter::CreatedBefore(cutoff) => {
                self.client
                    .query(
                        "SELECT id FROM donors \
                         WHERE date_created < $1 AND personal_data_removed_at IS NULL AND id > $2 \
                         ORDER BY id LIMIT $3",
                        &[&cutoff, &after, &limit],
                    )
                    .await?
            }
        };

        rows.iter()
            .map(|row| {
                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| VaultError::Database(format!("Failed to read id: {e}")))?;
                DonorId::new(id).map_err(VaultError::Database)
            })
            .collect()
    }

    async fn update_encrypted_address(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_address: &str,
    ) -> Result<bool> {
        let updated = self
            .client
            .execute(
                "UPDATE donors SET encrypted_address = $3, version = version + 1 \
                 WHERE id = $1 AND version = $2",
                &[&id.get(), &expected_version, &encrypted_address],
            )
            .await?;
        Ok(updated == 1)
    }

    async fn update_encrypted_fields(
        &self,
        id: DonorId,
        expected_version: i64,
        encrypted_national_id: &str,
        encrypted_address: &str,
    ) -> Result<bool> {
        let updated = self
            .client
            .execute(
                "UPDATE donors SET encrypted_cnp = $3, encrypted_address = $4, \
                 version = version + 1 WHERE id = $1 AND version = $2",
                &[
                    &id.get(),
                    &expected_version,
                    &encrypted_national_id,
                    &encrypted_address,
                ],
            )
            .await?;
        Ok(updated == 1)
    }

    async fn save_anonymized(&self, donor: &Donor, expected_version: i64) -> Result<bool> {
        let statement = r#"
            UPDATE donors SET
                first_name = $3,
                last_name = $4,
                initial = $5,
                encrypted_cnp = $6,
                encrypted_address = $7,
                phone = $8,
                email = $9,
                geoip = $10,
                pdf_file = $11,
                personal_data_removal_started_at = $12,
                personal_data_removed_at = $13,
                version = version + 1
            WHERE id = $1 AND version = $2 AND personal_data_removed_at IS NULL
        "#;

        let geoip = geoip_value(donor);
        let updated = self
            .client
            .execute(
                statement,
                &[
                    &donor.id.get(),
                    &expected_version,
                    &donor.first_name,
                    &donor.last_name,
                    &donor.initial,
                    &donor.encrypted_national_id,
                    &donor.encrypted_address,
                    &donor.phone,
                    &donor.email,
                    &geoip,
                    &donor.document_file,
                    &donor.personal_data_removal_started_at,
                    &donor.personal_data_removed_at,
                ],
            )
            .await?;
        Ok(updated == 1)
    }
}
