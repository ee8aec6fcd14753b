//! In-memory blob storage

use super::FileStorage;
use crate::domain::{Result, VaultError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// HashMap-backed [`FileStorage`] with optional per-name delete failures
#[derive(Clone, Default)]
pub struct InMemoryFileStorage {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failing_deletes: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delete of `name` fail
    pub async fn fail_deletes_of(&self, name: &str) {
        self.failing_deletes.write().await.insert(name.to_string());
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.blobs
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        if self.failing_deletes.read().await.contains(name) {
            return Err(VaultError::Storage(format!("simulated delete failure for {name}")));
        }
        Ok(self.blobs.write().await.remove(name).is_some())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.read().await.contains_key(name))
    }
}
