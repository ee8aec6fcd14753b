//! Audit logging module
//!
//! Append-only record of every committed anonymization.

pub mod logger;

pub use logger::AuditLogger;
