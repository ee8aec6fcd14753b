//! Batch jobs over donor records.
//!
//! # Modules
//!
//! - [`tasks`] - Jobs, dispatchers and the keyset scheduler
//! - [`repair`] - Rewrites legacy encrypted addresses in the canonical format
//! - [`rotation`] - Re-encrypts tokens still sealed under a previous key
//! - [`batch`] - Per-batch outcome counters
//! - [`summary`] - Scheduling and drain summaries
//!
//! # Workflow
//!
//! 1. **Enumerate**: page through matching donor keys in ascending order
//! 2. **Dispatch**: hand one job per page to the configured dispatcher
//! 3. **Process**: each job loads its donors and handles them one by one
//! 4. **Drain**: wait for outstanding jobs and merge their counters
//!
//! # Example
//!
//! ```rust,no_run
//! use donorvault::adapters::memory::InMemoryDonorStore;
//! use donorvault::adapters::storage::memory::InMemoryFileStorage;
//! use donorvault::anonymization::AnonymizationEngine;
//! use donorvault::codec::{DonorCodecs, FieldCipher};
//! use donorvault::core::repair::RepairScheduler;
//! use donorvault::core::tasks::{JobRunner, TaskDispatcher, WorkerPoolDispatcher};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cipher = Arc::new(FieldCipher::from_secret("0123456789abcdef0123456789abcdef")?);
//! let codecs = DonorCodecs::new(cipher);
//! let store = Arc::new(InMemoryDonorStore::new());
//! let storage = Arc::new(InMemoryFileStorage::new());
//! let engine = Arc::new(AnonymizationEngine::new(store.clone(), storage));
//! let runner = Arc::new(JobRunner::new(store.clone(), codecs, engine));
//! let dispatcher = Arc::new(WorkerPoolDispatcher::new(runner, 4));
//!
//! let summary = RepairScheduler::new(store, dispatcher.clone())
//!     .schedule_repair(1000)
//!     .await?;
//! let drained = dispatcher.drain().await?;
//! println!("{} batches, {} repaired", summary.batches_dispatched, drained.records.updated);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod repair;
pub mod rotation;
pub mod summary;
pub mod tasks;

pub use batch::BatchResult;
pub use summary::{DrainSummary, ScheduleSummary};
