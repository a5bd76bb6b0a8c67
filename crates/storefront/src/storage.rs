//! Local persisted client state.
//!
//! The browser storefront kept its durable state (token, cart, selected
//! location) in local storage under fixed string keys. Here that becomes a
//! small JSON file holding a flat key/value map, loaded once and rewritten
//! after every mutation. Values are arbitrary JSON so each owner decides its
//! own schema.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Fixed keys for persisted state.
pub mod keys {
    /// Customer bearer token.
    pub const TOKEN: &str = "pizza_token";

    /// Anonymous session id sent as `X-Session-Id`.
    pub const SESSION_ID: &str = "pizza_session_id";

    /// Cart lines (local mode only; the backend cart is never persisted).
    pub const CART: &str = "pizza_cart";

    /// Selected store location.
    pub const LOCATION: &str = "pizza_location";

    /// Admin token, role, and store id (separately namespaced from the
    /// customer token).
    pub const ADMIN_AUTH: &str = "admin_auth";
}

/// Errors that can occur reading or writing the state file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file or a stored value is not valid JSON.
    #[error("state file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// File-backed key/value store for client state.
///
/// Cheap to clone; all clones share the same in-memory map and file.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    map: Mutex<BTreeMap<String, Value>>,
}

impl LocalStore {
    /// Open (or create) the store at `path`.
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(contents) if !contents.trim().is_empty() => serde_json::from_str(&contents)?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                map: Mutex::new(map),
            }),
        })
    }

    /// Read a value. Returns `None` if the key is absent or the stored value
    /// does not deserialize as `T` (stale state degrades to "not set").
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.lock();
        let value = map.get(key)?.clone();
        drop(map);
        serde_json::from_value(value).ok()
    }

    /// Write a value and persist the file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_value(value)?;
        let mut map = self.lock();
        map.insert(key.to_string(), json);
        self.flush(&map)
    }

    /// Remove a key and persist the file. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.lock();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&map)
    }

    /// Get the persistent anonymous session id, creating one on first use.
    ///
    /// Ids look like `sess_k3j9x7...` and never change once minted.
    ///
    /// # Errors
    ///
    /// Returns an error if a freshly minted id cannot be persisted.
    pub fn session_id(&self) -> Result<String, StorageError> {
        if let Some(id) = self.get::<String>(keys::SESSION_ID) {
            return Ok(id);
        }
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let id = format!("sess_{}", suffix.to_lowercase());
        self.insert(keys::SESSION_ID, &id)?;
        Ok(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.inner
            .map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, map: &BTreeMap<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.inner.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.inner.path, contents)?;
        Ok(())
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let path = std::env::temp_dir().join(format!(
            "stonefire-store-test-{}.json",
            uuid::Uuid::new_v4()
        ));
        LocalStore::open(path).unwrap()
    }

    #[test]
    fn test_roundtrip_and_remove() {
        let store = temp_store();
        store.insert(keys::TOKEN, &"tok_abc".to_string()).unwrap();
        assert_eq!(store.get::<String>(keys::TOKEN).as_deref(), Some("tok_abc"));

        store.remove(keys::TOKEN).unwrap();
        assert_eq!(store.get::<String>(keys::TOKEN), None);
        // Removing again is a no-op
        store.remove(keys::TOKEN).unwrap();
    }

    #[test]
    fn test_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "stonefire-store-test-{}.json",
            uuid::Uuid::new_v4()
        ));
        {
            let store = LocalStore::open(&path).unwrap();
            store.insert("answer", &42_u32).unwrap();
        }
        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get::<u32>("answer"), Some(42));
    }

    #[test]
    fn test_session_id_is_stable() {
        let store = temp_store();
        let first = store.session_id().unwrap();
        assert!(first.starts_with("sess_"));
        assert_eq!(store.session_id().unwrap(), first);
    }

    #[test]
    fn test_mismatched_type_reads_as_none() {
        let store = temp_store();
        store.insert("numberish", &"not a number").unwrap();
        assert_eq!(store.get::<u64>("numberish"), None);
    }
}
