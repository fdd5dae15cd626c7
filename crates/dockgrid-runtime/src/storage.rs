#![forbid(unsafe_code)]

//! Key-value storage backends for layout snapshots.
//!
//! A backend stores opaque string values under a [`StorageKey`]. The codec
//! in [`crate::store`] decides what the strings contain.
//!
//! - [`MemoryStorage`]: in-process map behind a shared, clonable handle.
//! - [`FileStorage`]: all entries in one JSON document on disk.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": [
//!     { "owner": "alice", "breakpoint": "md", "value": "{...}" }
//!   ]
//! }
//! ```
//!
//! # Atomic Writes
//!
//! [`FileStorage`] writes a sibling temp file and renames it over the target,
//! so readers never observe a half-written document.
//!
//! # Recovery
//!
//! Reads of an undecodable document (bad JSON or another format version)
//! fail. A write over such a document moves it to a `.json.corrupt` sibling
//! and starts a fresh one, so the next save always lands.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Current [`FileStorage`] document version.
const FILE_FORMAT_VERSION: u32 = 1;

/// Composite key: owner identifier plus breakpoint name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey {
    pub owner: String,
    pub breakpoint: String,
}

impl StorageKey {
    #[must_use]
    pub fn new(owner: impl Into<String>, breakpoint: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            breakpoint: breakpoint.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.breakpoint)
    }
}

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unsupported storage format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },
    #[error("{backend} storage backend failed: {message}")]
    Backend { backend: String, message: String },
}

/// Convenience alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous key-value store for serialized snapshots.
///
/// Writes under an existing key replace the previous value whole.
pub trait StorageBackend {
    /// Short backend name for diagnostics.
    fn name(&self) -> &str;

    /// Value under `key`, or `None` if absent.
    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &StorageKey, value: &str) -> StorageResult<()>;

    /// Delete `key`. Returns whether it existed.
    fn remove(&self, key: &StorageKey) -> StorageResult<bool>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<StorageKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        self.lock().insert(key.clone(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    owner: String,
    breakpoint: String,
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    entries: Vec<FileEntry>,
}

/// Single-document JSON file backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Back storage by `path`. The parent directory must exist; the file is
    /// created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> StorageResult<Vec<FileEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: StorageFile = serde_json::from_str(&contents)?;
        if file.version != FILE_FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormat {
                found: file.version,
                expected: FILE_FORMAT_VERSION,
            });
        }
        Ok(file.entries)
    }

    /// Entries to build the next write on. An undecodable document is set
    /// aside and replaced by an empty one; I/O errors still propagate.
    fn entries_for_write(&self) -> StorageResult<Vec<FileEntry>> {
        match self.load_entries() {
            Ok(entries) => Ok(entries),
            Err(StorageError::Io(error)) => Err(StorageError::Io(error)),
            Err(error) => {
                let aside = self.path.with_extension("json.corrupt");
                std::fs::rename(&self.path, &aside)?;
                tracing::warn!(
                    target: "dockgrid.store",
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    %error,
                    "storage document unreadable; starting a new one"
                );
                Ok(Vec::new())
            }
        }
    }

    fn store_entries(&self, mut entries: Vec<FileEntry>) -> StorageResult<()> {
        entries.sort_by(|a, b| (&a.owner, &a.breakpoint).cmp(&(&b.owner, &b.breakpoint)));
        let file = StorageFile {
            version: FILE_FORMAT_VERSION,
            entries,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

fn matches_key(entry: &FileEntry, key: &StorageKey) -> bool {
    entry.owner == key.owner && entry.breakpoint == key.breakpoint
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(self
            .load_entries()?
            .into_iter()
            .find(|entry| matches_key(entry, key))
            .map(|entry| entry.value))
    }

    fn write(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        let mut entries = self.entries_for_write()?;
        entries.retain(|entry| !matches_key(entry, key));
        entries.push(FileEntry {
            owner: key.owner.clone(),
            breakpoint: key.breakpoint.clone(),
            value: value.to_owned(),
        });
        self.store_entries(entries)
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<bool> {
        let mut entries = self.load_entries()?;
        let before = entries.len();
        entries.retain(|entry| !matches_key(entry, key));
        if entries.len() == before {
            return Ok(false);
        }
        self.store_entries(entries)?;
        Ok(true)
    }
}
