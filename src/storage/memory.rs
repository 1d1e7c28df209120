use std::{
    collections::HashMap,
    io,
    sync::{Arc, RwLock},
};

use crate::errors::StorageError;

use super::{KeyValueStore, Result};

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what a service persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.entries.write() {
            guard.insert(key.to_string(), value.into());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::Other,
        "memory store lock poisoned",
    ))
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        guard.remove(key);
        Ok(())
    }
}
