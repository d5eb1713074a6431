//! Keyed TTL store persisted to a single JSON file
//!
//! Provides a `FileStore` that maps string keys to previously fetched JSON
//! documents plus a write timestamp. Entries past their TTL are ignored by
//! reads but stay in the file until overwritten.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// File name used by [`FileStore::open_default`]
const DEFAULT_STORE_FILE: &str = "lookout.json";

/// Errors that can occur when persisting the cache table
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be written
    #[error("failed to persist cache table: {0}")]
    Persist(#[from] io::Error),

    /// The in-memory table could not be serialized
    #[error("failed to serialize cache table: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single cached document and the moment it was stored
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    /// When the value was written, UTC
    timestamp: DateTime<Utc>,
    /// The cached document; the store never inspects its shape
    value: Value,
}

/// The full cache table as it appears at the root of the backing file:
/// one top-level field per cache key.
type Table = BTreeMap<String, StoredEntry>;

/// Keyed store for fetched JSON documents, persisted to one backing file
///
/// Every `get` and `put` re-reads the whole table from disk; the file is the
/// source of truth and nothing is cached in memory between calls. Writes
/// replace the file through a temporary sibling and an atomic rename, so a
/// concurrent reader never observes a partially written table.
///
/// Clones share the same write lock, which serializes the read-modify-write
/// span of `put` within this process. Writers in separate processes sharing
/// one backing file can still race each other and lose the older of two
/// updates; the cost is one extra remote fetch, never corrupt data.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Location of the backing file
    path: PathBuf,
    /// Serializes the read-modify-write span of `put`
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Creates a store backed by the platform cache directory
    /// (`~/.cache/lookout/lookout.json` on Linux).
    ///
    /// Returns `None` if the cache directory cannot be determined
    /// (e.g., no home directory).
    pub fn open_default() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "lookout")?;
        Some(Self::with_path(
            project_dirs.cache_dir().join(DEFAULT_STORE_FILE),
        ))
    }

    /// Creates a store backed by the given file path
    ///
    /// The file does not need to exist yet; it is created on first `put`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Looks up `key`, returning the stored document if it is younger
    /// than `ttl`.
    ///
    /// Returns `None` when the key is absent or its entry is stale. Stale
    /// entries are ignored, not deleted. A missing backing file is the
    /// bootstrap case (empty table), and an unparseable one degrades to the
    /// empty table as well, so callers can always fall through to a fresh
    /// fetch. `get` never writes to the backing file.
    ///
    /// The empty string is an ordinary key.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<Value> {
        let mut table = self.load_table();
        let entry = table.remove(key)?;

        let age = Utc::now().signed_duration_since(entry.timestamp);
        if age < ttl {
            debug!(key, "cache hit");
            Some(entry.value)
        } else {
            debug!(key, age_secs = age.num_seconds(), "cache entry stale");
            None
        }
    }

    /// Stores `value` under `key`, stamped with the current time.
    ///
    /// This is a read-modify-write of the full table: entries for all other
    /// keys are preserved, the entry for `key` is replaced outright. The
    /// whole span holds the store's write lock, and the rewrite lands via
    /// temp-file-then-rename.
    pub fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        // A poisoned lock means another writer panicked mid-`put`; the file
        // itself is still a complete table, so carry on.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut table = self.load_table();
        table.insert(
            key.to_string(),
            StoredEntry {
                timestamp: Utc::now(),
                value,
            },
        );

        let json = serde_json::to_string_pretty(&table)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Reads the table from the backing file
    ///
    /// A missing file is the bootstrap case. Unreadable or unparseable
    /// content degrades to the empty table with a warning; the next
    /// successful `put` replaces it with a valid one.
    fn load_table(&self) -> Table {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Table::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read backing file, treating table as empty"
                );
                return Table::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "backing file is not a valid cache table, treating it as empty"
                );
                Table::new()
            }
        }
    }
}
