//! Blob storage for signed redirection forms

pub mod local;
pub mod memory;

pub use local::LocalFileStorage;
pub use memory::InMemoryFileStorage;

use crate::domain::Result;
use async_trait::async_trait;

/// Named blob storage
///
/// Names are relative paths such as
/// `donation-forms/2024/c-3-.../17_..._form.pdf`.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous content
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Remove the blob; returns whether it existed
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Whether a blob is stored under `name`
    async fn exists(&self, name: &str) -> Result<bool>;
}
