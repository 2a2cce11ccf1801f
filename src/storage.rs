//! Key-value persistence for the session.
//!
//! The session is stored as one serialized document under a single
//! namespaced key. Reads happen once, synchronously, when the session is
//! initialized; writes happen on every lifecycle transition.

use crate::errors::ClientError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Synchronous key-value store holding serialized session documents.
pub trait SessionStore: Send + Sync + Debug {
    /// Returns the value stored under `key`, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] when the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] when the value cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] when the backing store cannot be updated.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temporary file and a rename, so a crash mid-write
/// never leaves a truncated session behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ClientError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ClientError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            ClientError::Storage(format!("failed to create {}: {e}", self.dir.display()))
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .map_err(|e| ClientError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path).map_err(|e| {
            ClientError::Storage(format!("failed to replace {}: {e}", path.display()))
        })
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load("auth-storage").unwrap(), None);

        store.save("auth-storage", "{}").unwrap();
        assert_eq!(store.load("auth-storage").unwrap().as_deref(), Some("{}"));

        store.remove("auth-storage").unwrap();
        assert_eq!(store.load("auth-storage").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_missing_key() {
        let store = MemoryStore::new();
        assert!(store.remove("never-saved").is_ok());
    }

    #[test]
    fn test_file_store_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.load("auth-storage").unwrap(), None);
        store.save("auth-storage", r#"{"a":1}"#).unwrap();

        let on_disk = fs::read_to_string(dir.path().join("nested/auth-storage.json")).unwrap();
        assert_eq!(on_disk, r#"{"a":1}"#);
        assert!(!dir.path().join("nested/auth-storage.json.tmp").exists());

        store.remove("auth-storage").unwrap();
        assert_eq!(store.load("auth-storage").unwrap(), None);
        assert!(store.remove("auth-storage").is_ok());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.save(key, "x").unwrap_err();
            assert!(matches!(err, ClientError::Storage(_)), "key {key:?}");
        }
    }
}
