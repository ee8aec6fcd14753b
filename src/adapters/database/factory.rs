//! Donor store factory

use crate::adapters::database::traits::DonorStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::VaultConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the donor store described by the configuration
///
/// Connects the PostgreSQL pool, checks connectivity and applies the embedded
/// schema before handing the store out.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or the database is unreachable.
pub async fn create_donor_store(config: &VaultConfig) -> Result<Arc<dyn DonorStore>> {
    tracing::info!("Creating PostgreSQL donor store");
    let client = PostgreSQLClient::new(config.postgresql.clone()).await?;
    let adapter = PostgreSQLAdapter::new(client);

    adapter.test_connection().await?;
    adapter.ensure_schema().await?;

    Ok(Arc::new(adapter))
}
