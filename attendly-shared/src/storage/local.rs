/// Local persistence adapter
///
/// Entity collections are stored as JSON arrays in a synchronous key-value
/// store, one key per entity type and organization.
///
/// # Key Scheme
///
/// ```text
/// attendance_organizations                 all organizations
/// attendance_{collection}_{organizationId} one tenant collection
/// attendance_{collection}                  legacy single-tenant collection
/// attendance_migration_completed           legacy migration flag
/// ```
///
/// Reads of a missing key return an empty collection. Writes serialize the
/// whole collection and replace the previous value in a single call.
///
/// # Backends
///
/// - [`MemoryStore`]: process-local map, used by tests and ephemeral runs
/// - [`FileStore`]: one file per key in a directory, survives restarts

use crate::error::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared prefix of every key written by this crate
pub const KEY_PREFIX: &str = "attendance";

/// Key holding the organizations collection
pub const ORGANIZATIONS_KEY: &str = "attendance_organizations";

/// Key of a tenant-scoped collection
pub fn collection_key(collection: &str, organization_id: &str) -> String {
    format!("{}_{}_{}", KEY_PREFIX, collection, organization_id)
}

/// Key of a legacy (pre-tenant) collection
pub fn legacy_key(collection: &str) -> String {
    format!("{}_{}", KEY_PREFIX, collection)
}

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.contains_key(key))
    }
}

/// Directory-backed key-value store
///
/// Each key maps to `{dir}/{key}.json`. Values are written to a temporary
/// file and renamed into place, so a reader never observes a partial write.
/// Keys are restricted to ASCII alphanumerics, `_` and `-`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes writers within this process; rename keeps readers consistent.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        debug!(dir = %dir.display(), "Opened local file store");

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        let io_err = |source: std::io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.path_for(key)?.is_file())
    }
}

/// Typed collection access over a [`KeyValueStore`]
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Arc::new(kv) }
    }

    /// Creates a store backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Loads a collection; a missing key yields an empty vector
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a
    /// JSON array of `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces a collection with `records`
    pub fn save<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &raw)?;
        debug!(key, count = records.len(), "Saved local collection");
        Ok(())
    }

    /// Removes a collection
    pub fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.kv.remove(key)?;
        debug!(key, "Cleared local collection");
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        self.kv.contains(key)
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.kv.get(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv.set(key, value)
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}
