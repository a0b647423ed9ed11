//! Process-native session storage with an explicit file lifecycle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SessionStashError};
use crate::storage::SessionStorage;

/// namespace -> key -> serialized value
type Namespaces = HashMap<String, HashMap<String, Vec<u8>>>;

/// The process-native session dataset.
///
/// One backend holds all session data for the current scope, partitioned by
/// namespace. It is opened from a session file at scope start and flushed
/// back at scope end; between those points all reads and writes are
/// in-memory. Containers never touch the backend directly - they go through
/// the namespaced [`NativeStorage`] views handed out by
/// [`storage`](SessionBackend::storage).
///
/// Clones share the same dataset, as do all views created from them.
#[derive(Debug, Clone)]
pub struct SessionBackend {
    data: Rc<RefCell<Namespaces>>,
    path: Option<PathBuf>,
}

impl SessionBackend {
    /// Create a transient backend with no session file.
    ///
    /// [`flush`](SessionBackend::flush) on a transient backend is a no-op.
    pub fn new() -> Self {
        Self {
            data: Rc::new(RefCell::new(HashMap::new())),
            path: None,
        }
    }

    /// Open the session file at `path`, loading its dataset.
    ///
    /// A missing file yields an empty dataset; the file appears on the
    /// first [`flush`](SessionBackend::flush).
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not valid session
    /// JSON.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let data = match std::fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(SessionStashError::SessionFile)?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!("opened session file {}", path.display());

        Ok(Self {
            data: Rc::new(RefCell::new(data)),
            path: Some(path),
        })
    }

    /// Write the dataset back to the session file.
    ///
    /// A no-op for transient backends.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes =
            serde_json::to_vec(&*self.data.borrow()).map_err(SessionStashError::SessionFile)?;
        std::fs::write(path, bytes)?;

        debug!("flushed session file {}", path.display());
        Ok(())
    }

    /// A storage adapter view scoped to `namespace`.
    pub fn storage(&self, namespace: impl Into<String>) -> NativeStorage {
        NativeStorage {
            data: Rc::clone(&self.data),
            namespace: namespace.into(),
        }
    }

    /// The session file path, if this backend is file-bound.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the dataset holds no namespaces.
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Whether any data is stored under `namespace`.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.data.borrow().contains_key(namespace)
    }
}

impl Default for SessionBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A namespaced view of a [`SessionBackend`].
///
/// Values are serialized to bytes on write and deserialized on read, so the
/// backend only ever holds primitive byte data. Namespaces isolate views
/// sharing one backend from each other.
#[derive(Debug, Clone)]
pub struct NativeStorage {
    data: Rc<RefCell<Namespaces>>,
    namespace: String,
}

impl NativeStorage {
    /// The namespace this view is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl SessionStorage for NativeStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let data = self.data.borrow();
        let Some(bytes) = data.get(&self.namespace).and_then(|ns| ns.get(key)) else {
            return Ok(None);
        };

        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|source| SessionStashError::Decode {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match value {
            Some(value) => {
                let bytes =
                    serde_json::to_vec(&value).map_err(|source| SessionStashError::Encode {
                        key: key.to_string(),
                        source,
                    })?;
                self.data
                    .borrow_mut()
                    .entry(self.namespace.clone())
                    .or_default()
                    .insert(key.to_string(), bytes);
            }
            None => {
                if let Some(ns) = self.data.borrow_mut().get_mut(&self.namespace) {
                    ns.remove(key);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.data.borrow_mut().remove(&self.namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stores_and_returns_value() {
        let backend = SessionBackend::new();
        let mut storage = backend.storage("foo");

        storage.set("a", Some(json!("b"))).unwrap();

        assert_eq!(storage.get("a").unwrap(), Some(json!("b")));
    }

    #[test]
    fn test_none_removes_key() {
        let backend = SessionBackend::new();
        let mut storage = backend.storage("foo");

        storage.set("a", Some(json!("b"))).unwrap();
        storage.set("c", Some(json!("d"))).unwrap();
        storage.set("a", None).unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("c").unwrap(), Some(json!("d")));
    }

    #[test]
    fn test_clear_removes_namespace_root() {
        let backend = SessionBackend::new();
        let mut storage = backend.storage("foo");

        storage.set("a", Some(json!("b"))).unwrap();
        storage.clear().unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert!(!backend.contains_namespace("foo"));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let backend = SessionBackend::new();
        let mut foo = backend.storage("foo");
        let mut bar = backend.storage("bar");

        foo.set("a", Some(json!(1))).unwrap();
        bar.set("a", Some(json!(2))).unwrap();

        assert_eq!(foo.get("a").unwrap(), Some(json!(1)));
        assert_eq!(bar.get("a").unwrap(), Some(json!(2)));

        foo.clear().unwrap();

        assert_eq!(foo.get("a").unwrap(), None);
        assert_eq!(bar.get("a").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_values_are_stored_as_bytes() {
        let backend = SessionBackend::new();
        let mut storage = backend.storage("foo");

        storage.set("a", Some(json!({ "n": 1 }))).unwrap();

        let data = backend.data.borrow();
        let bytes = data.get("foo").and_then(|ns| ns.get("a")).unwrap();
        assert_eq!(bytes, br#"{"n":1}"#);
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SessionBackend::open(dir.path().join("absent.json")).unwrap();

        assert!(backend.is_empty());
        assert_eq!(backend.storage("foo").get("a").unwrap(), None);
    }

    #[test]
    fn test_flush_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let backend = SessionBackend::open(&path).unwrap();
        let mut storage = backend.storage("foo");
        storage.set("a", Some(json!({ "name": "bob" }))).unwrap();
        backend.flush().unwrap();

        let reopened = SessionBackend::open(&path).unwrap();
        let storage = reopened.storage("foo");

        assert_eq!(storage.get("a").unwrap(), Some(json!({ "name": "bob" })));
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = SessionBackend::open(&path).unwrap_err();
        assert!(matches!(err, SessionStashError::SessionFile(_)));
    }

    #[test]
    fn test_transient_flush_is_noop() {
        let backend = SessionBackend::new();
        backend.storage("foo").set("a", Some(json!(1))).unwrap();

        assert!(backend.flush().is_ok());
        assert!(backend.path().is_none());
    }

    #[test]
    fn test_views_share_backend_data() {
        let backend = SessionBackend::new();
        let mut writer = backend.storage("foo");
        let reader = backend.storage("foo");

        writer.set("a", Some(json!("b"))).unwrap();

        assert_eq!(reader.get("a").unwrap(), Some(json!("b")));
        assert_eq!(reader.namespace(), "foo");
    }
}
