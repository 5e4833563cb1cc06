//! Storage
//!
//! Scoped key-value persistence for carts, wishlists and orders. Values are whole
//! JSON documents; every write replaces the previous document for its key.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::trace;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("stored document for {key:?} is malformed: {source}")]
    Serialization {
        /// Key of the document
        key: String,

        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Keys may only contain ASCII letters, digits, `-` and `_`.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The in-memory store was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The backing store refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage addressed by key.
#[automock]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<FxHashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, FxHashMap<String, String>>, StorageError> {
        self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);

        Ok(())
    }
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Directory holding the stored documents
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        // Write then rename so readers never see a half-written document.
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Load and decode the JSON document stored under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the store fails or the document is malformed.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        trace!(key, "no stored document");

        return Ok(None);
    };

    let value = serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;

    trace!(key, bytes = raw.len(), "loaded stored document");

    Ok(Some(value))
}

/// Encode `value` as JSON and store it under `key`, replacing any previous value.
///
/// # Errors
///
/// Returns a [`StorageError`] if encoding or the write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;

    store.set(key, &raw)?;

    trace!(key, bytes = raw.len(), "saved document");

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_clones_share_entries() -> TestResult {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("cart", "[]")?;

        assert_eq!(other.get("cart")?.as_deref(), Some("[]"));

        other.remove("cart")?;

        assert_eq!(store.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_store_round_trips_and_removes() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        assert_eq!(store.get("orders")?, None);

        store.set("orders", "{\"a\":1}")?;

        assert!(dir.path().join("orders.json").exists(), "document written");
        assert_eq!(store.get("orders")?.as_deref(), Some("{\"a\":1}"));

        store.remove("orders")?;
        store.remove("orders")?;

        assert_eq!(store.get("orders")?, None);

        Ok(())
    }

    #[test]
    fn file_store_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        for key in ["../cart", "a/b", "", "cart.json"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }

        Ok(())
    }

    #[test]
    fn load_json_reports_malformed_documents() -> TestResult {
        let store = MemoryStore::new();
        store.set("cart", "not json")?;

        let result: Result<Option<Vec<u32>>, _> = load_json(&store, "cart");

        assert!(
            matches!(result, Err(StorageError::Serialization { ref key, .. }) if key == "cart"),
            "malformed document should fail to decode"
        );

        Ok(())
    }

    #[test]
    fn save_json_then_load_json() -> TestResult {
        let store = MemoryStore::new();

        save_json(&store, "wishlist", &vec!["product-1", "product-2"])?;

        let loaded: Option<Vec<String>> = load_json(&store, "wishlist")?;

        assert_eq!(
            loaded,
            Some(vec!["product-1".to_string(), "product-2".to_string()])
        );

        Ok(())
    }

    #[test]
    fn save_json_propagates_store_failures() {
        let mut store = MockKeyValueStore::new();

        store
            .expect_set()
            .returning(|_, _| Err(StorageError::Unavailable("quota exceeded".to_string())));

        assert!(matches!(
            save_json(&store, "cart", &[1, 2, 3]),
            Err(StorageError::Unavailable(_))
        ));
    }
}
