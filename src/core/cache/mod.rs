//! # Cache Module
//!
//! Persists hash results and thumbnail references so repeat scans never
//! redo work.
//!
//! ## Layout
//! A flat string-keyed store with two key namespaces:
//! - `<photo id>` - the photo's content hash
//! - `thumb://<photo id>` - the resolved thumbnail reference
//!
//! Both namespaces are append-only; entries are never evicted. A write
//! that fails (or a crash before it) simply means recomputation on the
//! next run.
//!
//! ## Backends
//! - `SqliteStore` - persistent storage using SQLite
//! - `InMemoryStore` - for testing

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KvStore;

use serde::{Deserialize, Serialize};

/// Key namespace prefix for thumbnail references
pub const THUMB_PREFIX: &str = "thumb://";

/// Cache key for a photo's content hash
pub fn hash_key(photo_id: i64) -> String {
    photo_id.to_string()
}

/// Cache key for a photo's thumbnail reference
pub fn thumb_key(photo_id: i64) -> String {
    format!("{THUMB_PREFIX}{photo_id}")
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of entries across both namespaces
    pub total_entries: usize,
    /// Entries holding content hashes
    pub hash_entries: usize,
    /// Entries holding thumbnail references
    pub thumb_entries: usize,
}
