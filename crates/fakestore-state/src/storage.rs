//! Durable key/value storage for client state.
//!
//! Each key maps to one JSON document. [`FileStorage`] keeps one file per key
//! in a state directory; [`MemoryStorage`] keeps them in a map and is used for
//! session-scoped state and tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StateError;

/// Storage key of the persisted cart.
pub const CART_KEY: &str = "cart-storage";
/// Storage key of the persisted login session.
pub const AUTH_KEY: &str = "auth-storage";
/// Storage key of the pending payment transaction reference.
pub const TX_REF_KEY: &str = "checkout-tx-ref";

pub trait StateStorage: Send + Sync + std::fmt::Debug {
    /// Returns the stored document, or `None` if the key was never written.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Replaces the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the backing store cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Deletes the stored document. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StateError>;
}

/// Reads and decodes the document under `key`.
///
/// # Errors
///
/// Returns [`StateError::Io`] on read failure and [`StateError::Decode`] if
/// the document is not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn StateStorage,
    key: &str,
) -> Result<Option<T>, StateError> {
    let Some(raw) = storage.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StateError::Decode {
            key: key.to_owned(),
            source,
        })
}

/// Encodes `value` and stores it under `key`.
///
/// # Errors
///
/// Returns [`StateError::Encode`] if `value` cannot be serialized and
/// [`StateError::Io`] on write failure.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn StateStorage,
    key: &str,
    value: &T,
) -> Result<(), StateError> {
    let raw = serde_json::to_string(value).map_err(|source| StateError::Encode {
        key: key.to_owned(),
        source,
    })?;
    storage.write(key, &raw)
}

/// One `<key>.json` file per key under a state directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StateError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StateError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StateError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StateError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.path_for(key);
        // Readers never observe a partially written document.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(|source| StateError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StateError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Io { path, source }),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StateError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.read(CART_KEY).unwrap(), None);
        storage.write(CART_KEY, r#"{"items":[]}"#).unwrap();
        assert_eq!(
            storage.read(CART_KEY).unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(dir.path().join("cart-storage.json").exists());
    }

    #[test]
    fn file_storage_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::open(&nested).unwrap();
        storage.write(AUTH_KEY, "{}").unwrap();
        assert!(nested.join("auth-storage.json").exists());
    }

    #[test]
    fn file_storage_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.write(TX_REF_KEY, "\"tx-1\"").unwrap();
        storage.remove(TX_REF_KEY).unwrap();
        storage.remove(TX_REF_KEY).unwrap();
        assert_eq!(storage.read(TX_REF_KEY).unwrap(), None);
    }

    #[test]
    fn load_json_reports_decode_errors() {
        let storage = MemoryStorage::new();
        storage.write(AUTH_KEY, "not json").unwrap();
        let result = load_json::<serde_json::Value>(&storage, AUTH_KEY);
        assert!(matches!(result, Err(StateError::Decode { ref key, .. }) if key == AUTH_KEY));
    }

    #[test]
    fn save_then_load_json() {
        let storage = MemoryStorage::new();
        save_json(&storage, TX_REF_KEY, "tx-123").unwrap();
        let loaded: Option<String> = load_json(&storage, TX_REF_KEY).unwrap();
        assert_eq!(loaded.as_deref(), Some("tx-123"));
    }
}
