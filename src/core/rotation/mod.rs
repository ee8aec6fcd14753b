//! Encryption key rotation
//!
//! After a new primary key is configured and the old one moved to
//! `encryption.previous_keys`, this job re-encrypts every token still sealed
//! under a previous key. Once a run finishes clean, the previous key can be
//! removed from the configuration.

pub mod batch;
pub mod scheduler;

pub use batch::rotate_batch;
pub use scheduler::RotationScheduler;
