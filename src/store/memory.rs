//! Implements the `BlobStore` trait in memory. Nothing outlives the process, so the CLI itself
//! always uses `FileBlobStore`; this backs the store's own tests and library callers that want a
//! throwaway store.

use crate::store::BlobStore;
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// An in-memory `BlobStore`. Clones share the same map, so a clone handed to a second
/// `TransactionStore` behaves like a second session against the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    /// Creates a store seeded with `key` holding `data`.
    pub fn with_blob(key: impl Into<String>, data: impl Into<String>) -> Self {
        let store = Self::default();
        store.lock().insert(key.into(), data.into());
        store
    }

    /// Returns a copy of whatever is stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&mut self, key: &str, data: &str) -> Result<()> {
        self.lock().insert(key.to_string(), data.to_string());
        Ok(())
    }
}
