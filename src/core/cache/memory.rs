//! In-memory store backend for testing.

use super::{CacheStats, KvStore, THUMB_PREFIX};
use crate::error::CacheError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory store backend
///
/// Useful for testing and scenarios where persistence isn't needed.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        entries.clear();
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        let thumb_entries = entries
            .keys()
            .filter(|k| k.starts_with(THUMB_PREFIX))
            .count();

        Ok(CacheStats {
            total_entries: entries.len(),
            hash_entries: entries.len() - thumb_entries,
            thumb_entries,
        })
    }
}
