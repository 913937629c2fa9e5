//! Store backend trait definition.

use super::CacheStats;
use crate::error::CacheError;

/// Trait for persistent key-value store backends
///
/// Absent keys are `Ok(None)`, never an error; I/O failures are signalled
/// distinctly. Implementations must be safe for concurrent access from
/// multiple worker threads, since each photo's processing touches only its
/// own keys but many photos are in flight at once.
pub trait KvStore: Send + Sync {
    /// Get a stored value if present
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any previous one for the key
    fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove all entries
    fn clear(&self) -> Result<(), CacheError>;

    /// Get store statistics
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
