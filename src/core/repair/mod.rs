//! Address repair
//!
//! Finds donors whose encrypted address still holds a legacy literal and
//! rewrites it in the canonical format, one batch at a time.

pub mod batch;
pub mod scheduler;

pub use batch::repair_batch;
pub use scheduler::RepairScheduler;
