// donorvault - Donor personal data lifecycle tooling
// Copyright (c) 2025 Redirectioneaza Contributors
// Licensed under the MIT License

//! # donorvault
//!
//! Personal data lifecycle for donor records of the donation redirection
//! platform: field encryption, irreversible anonymization, legacy address
//! repair, retention sweeps and encryption key rotation.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch jobs (address repair, key rotation) and task dispatch
//! - [`anonymization`] - Personal data removal, retention sweep, audit log
//! - [`codec`] - Fernet field encryption and the canonical address format
//! - [`adapters`] - Donor store (PostgreSQL, in-memory) and blob storage
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use donorvault::codec::{DonorCodecs, FieldCipher};
//! use donorvault::domain::{Address, Donor, DonorId};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cipher = Arc::new(FieldCipher::from_secret("0123456789abcdef0123456789abcdef")?);
//! let codecs = DonorCodecs::new(cipher);
//!
//! let donor = Donor::builder()
//!     .id(DonorId::new(1)?)
//!     .name("Ana", "Popescu", "M")
//!     .national_id(&codecs.national_id, "1800101221144")?
//!     .address(&codecs.address, &Address::new("Calea Victoriei", "12"))?
//!     .build()?;
//!
//! assert_eq!(donor.national_id(&codecs.national_id)?, "1800101221144");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Batches run as independent tokio tasks. Every write is guarded by the
//! record's `version` column; anonymization retries a lost race, repair and
//! rotation skip it and pick the donor up on the next run.
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`] with [`domain::VaultError`];
//! the CLI maps failures onto exit codes.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
