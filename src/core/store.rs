//! Entity store - typed JSON values over a key-value backend
//!
//! Every key holds one JSON document: a full list for record collections
//! (`clients`, `work_orders`) or a single value (`user`, `token`,
//! `order_sequence`). Writes replace the whole document; there is no
//! locking, so two writers racing on the same key resolve as last write wins.
//!
//! Reads never fail: a missing or undecodable value yields the caller's
//! default and a corrupt one is logged.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::entity::Record;
use crate::core::project::Project;

/// Raw string storage addressed by key
pub trait KeyValueBackend {
    /// Fetch the raw value for a key, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a raw value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Errors surfaced by store writes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode store key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write beside the target and rename so readers never see a torn file
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// In-process backend, mainly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Typed access to persisted collections and values
#[derive(Debug)]
pub struct EntityStore<B: KeyValueBackend> {
    backend: B,
}

impl EntityStore<FileBackend> {
    /// Open the file-backed store of a project
    pub fn open(project: &Project) -> Self {
        Self::new(FileBackend::new(project.store_dir()))
    }
}

impl EntityStore<MemoryBackend> {
    /// Empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: KeyValueBackend> EntityStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Decode the value under `key`, or `default` when missing or corrupt
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.read_opt(key).unwrap_or(default)
    }

    /// Decode the value under `key`, `None` when missing or corrupt
    pub fn read_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "store key absent");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt store value, using default");
                None
            }
        }
    }

    /// Encode and persist `value`, replacing whatever `key` held
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &raw)?;
        tracing::debug!(key, bytes = raw.len(), "store key written");
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }

    /// Whether a key currently has any stored value (valid or not)
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(_)))
    }

    /// Load the full collection for a record type
    pub fn load<R: Record>(&self) -> Vec<R> {
        self.read(R::KEY, Vec::new())
    }

    /// Replace the full collection for a record type
    pub fn save<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        self.write(R::KEY, records)
    }
}
