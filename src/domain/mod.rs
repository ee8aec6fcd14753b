//! Domain models and types for donorvault.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DonorId`], [`CauseId`], [`NgoId`])
//! - **Domain models** ([`Donor`], [`Address`])
//! - **Error types** ([`VaultError`] and the codec error enums)
//! - **Result type alias** ([`Result`])
//!
//! # Builder Pattern
//!
//! ```rust
//! use donorvault::domain::{Donor, DonorId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let donor = Donor::builder()
//!     .id(DonorId::new(1)?)
//!     .name("Ana", "Popescu", "M")
//!     .location("Cluj-Napoca", "Cluj")
//!     .build()?;
//! assert!(!donor.is_anonymized());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod donor;
pub mod errors;
pub mod ids;
pub mod result;

pub use address::Address;
pub use donor::{document_path, Donor, DonorBuilder, IncomeType};
pub use errors::{
    AddressFormatError, DecryptionError, EncryptionError, LegacyAddressError, VaultError,
};
pub use ids::{CauseId, DonorId, NgoId};
pub use result::Result;
