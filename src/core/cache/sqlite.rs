//! SQLite store backend for persistent storage.

use super::{CacheStats, KvStore, THUMB_PREFIX};
use crate::error::CacheError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// SQLite-backed persistent store
///
/// Uses WAL (Write-Ahead Logging) mode for better concurrent access.
/// WAL allows readers to proceed even while writes are happening; the
/// connection itself is serialized behind a mutex, giving the
/// single-writer discipline the pipeline workers rely on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create a store database at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    fn now_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs() as i64
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })?;

        let result: Result<String, _> = conn.query_row(
            "SELECT value FROM entries WHERE key = ?",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::QueryFailed(e.to_string())),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })?;

        conn.execute(
            "INSERT OR REPLACE INTO entries (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, Self::now_timestamp()],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })?;

        conn.execute("DELETE FROM entries", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })?;

        let total_entries: usize = conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let thumb_entries: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE key LIKE ?",
                [format!("{THUMB_PREFIX}%")],
                |row| row.get::<_, i64>(0).map(|v| v as usize),
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(CacheStats {
            total_entries,
            hash_entries: total_entries - thumb_entries,
            thumb_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{hash_key, thumb_key};
    use tempfile::TempDir;

    #[test]
    fn sqlite_store_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("gallery.db");

        let store = SqliteStore::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(store.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn sqlite_store_round_trips_values() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("gallery.db")).unwrap();

        store.put(&hash_key(7), "abc123").unwrap();

        assert_eq!(store.get(&hash_key(7)).unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn absent_key_is_none_not_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("gallery.db")).unwrap();

        assert!(store.get("12345").unwrap().is_none());
    }

    #[test]
    fn put_replaces_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("gallery.db")).unwrap();

        store.put("1", "old").unwrap();
        store.put("1", "new").unwrap();

        assert_eq!(store.get("1").unwrap().as_deref(), Some("new"));
        assert_eq!(store.stats().unwrap().total_entries, 1);
    }

    #[test]
    fn stats_split_namespaces() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("gallery.db")).unwrap();

        store.put(&hash_key(1), "aa").unwrap();
        store.put(&hash_key(2), "bb").unwrap();
        store.put(&thumb_key(1), "/cache/thumb_1.jpg").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.hash_entries, 2);
        assert_eq!(stats.thumb_entries, 1);
    }

    #[test]
    fn values_persist_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("gallery.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.put("1", "persisted").unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get("1").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn clear_removes_all_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("gallery.db")).unwrap();

        store.put("1", "a").unwrap();
        store.put("2", "b").unwrap();
        store.clear().unwrap();

        assert_eq!(store.stats().unwrap().total_entries, 0);
    }
}
