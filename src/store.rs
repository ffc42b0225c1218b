//! Key-value stores
//!
//! Cart snapshots are persisted as opaque bytes under a single key. Stores
//! may fail; callers decide whether a failure matters.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised by key-value stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key contains characters the store can't address.
    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    /// The backing medium failed.
    #[error("Store IO error: {0}")]
    Io(#[from] io::Error),

    /// The store is unavailable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A byte-oriented key-value store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store can't be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store can't be written.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// In-process store backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_vec());

        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key inside a directory.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base_path: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding the stored files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.file_path(key)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.file_path(key)?;

        fs::create_dir_all(&self.base_path)?;
        fs::write(path, value)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_round_trip() -> TestResult {
        let mut store = MemoryStore::new();

        assert_eq!(store.get("shopping-cart")?, None);

        store.set("shopping-cart", b"{}")?;

        assert_eq!(store.get("shopping-cart")?, Some(b"{}".to_vec()));
        assert_eq!(store.len(), 1);

        Ok(())
    }

    #[test]
    fn memory_store_overwrites() -> TestResult {
        let mut store = MemoryStore::new();

        store.set("k", b"one")?;
        store.set("k", b"two")?;

        assert_eq!(store.get("k")?, Some(b"two".to_vec()));

        Ok(())
    }

    #[test]
    fn directory_store_missing_key_is_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = DirectoryStore::new(dir.path());

        assert_eq!(store.get("shopping-cart")?, None);

        Ok(())
    }

    #[test]
    fn directory_store_creates_directory_on_write() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = DirectoryStore::new(dir.path().join("nested"));

        store.set("shopping-cart", b"[1]")?;

        assert!(dir.path().join("nested").join("shopping-cart.json").exists());
        assert_eq!(store.get("shopping-cart")?, Some(b"[1]".to_vec()));

        Ok(())
    }

    #[test]
    fn directory_store_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = DirectoryStore::new(dir.path());

        assert!(matches!(
            store.set("../escape", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));

        Ok(())
    }
}
