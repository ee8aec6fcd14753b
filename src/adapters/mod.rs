//! External system integrations for donorvault.
//!
//! - [`database`] - the [`database::DonorStore`] trait and its factory
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - in-memory implementation for tests
//! - [`storage`] - blob storage for signed forms
//!
//! # Example
//!
//! ```rust
//! use donorvault::adapters::database::{DonorStore, KeyFilter};
//! use donorvault::adapters::memory::InMemoryDonorStore;
//! use donorvault::domain::{Donor, DonorId};
//!
//! # async fn example() -> donorvault::domain::Result<()> {
//! let store = InMemoryDonorStore::new();
//! let donor = Donor::builder().id(DonorId::new(1).unwrap()).build().unwrap();
//! store.insert_donor(&donor).await?;
//! let keys = store.next_keys(KeyFilter::AnyEncryptedField, None, 100).await?;
//! assert!(keys.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod storage;
