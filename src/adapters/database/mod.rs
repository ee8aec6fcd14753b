//! Database abstraction layer
//!
//! [`DonorStore`] is implemented by the PostgreSQL adapter for production and
//! by [`crate::adapters::memory::InMemoryDonorStore`] for tests and dry runs.

pub mod factory;
pub mod traits;

pub use factory::create_donor_store;
pub use traits::{DonorStore, KeyFilter};
