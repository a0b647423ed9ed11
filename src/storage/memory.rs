//! In-memory storage adapter for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::storage::SessionStorage;

/// A storage adapter backed by a plain in-process map.
///
/// Intended for tests and examples: values are held structurally with no
/// serialization step, and clones share the same underlying map, so a test
/// can keep one handle for inspection while a container owns another.
/// Each independently-constructed instance is its own partition, so no
/// namespace is involved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<HashMap<String, Value>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value for `key`, if any.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.data.borrow().get(key).cloned()
    }

    /// All stored keys, in arbitrary order.
    pub fn keys(&self) -> Vec<String> {
        self.data.borrow().keys().cloned().collect()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Seed a value directly, bypassing any container.
    pub fn seed(&self, key: impl Into<String>, value: Value) {
        self.data.borrow_mut().insert(key.into(), value);
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match value {
            Some(value) => {
                self.data.borrow_mut().insert(key.to_string(), value);
            }
            None => {
                self.data.borrow_mut().remove(key);
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.data.borrow_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stores_and_returns_value() {
        let mut storage = MemoryStorage::new();

        storage.set("a", Some(json!("b"))).unwrap();

        assert_eq!(storage.get("a").unwrap(), Some(json!("b")));
    }

    #[test]
    fn test_none_removes_key() {
        let mut storage = MemoryStorage::new();

        storage.set("a", Some(json!("b"))).unwrap();
        storage.set("c", Some(json!("d"))).unwrap();
        storage.set("a", None).unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        // Other keys are untouched.
        assert_eq!(storage.get("c").unwrap(), Some(json!("d")));
    }

    #[test]
    fn test_missing_key_is_not_an_error() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing").unwrap(), None);
    }

    #[test]
    fn test_clear_removes_all_data() {
        let mut storage = MemoryStorage::new();

        storage.set("a", Some(json!("b"))).unwrap();
        storage.set("c", Some(json!("d"))).unwrap();
        storage.clear().unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("c").unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.set("a", Some(json!("b"))).unwrap();

        assert_eq!(observer.value("a"), Some(json!("b")));
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn test_seed_is_visible_through_trait() {
        let storage = MemoryStorage::new();
        storage.seed("a", json!(1));

        assert_eq!(storage.get("a").unwrap(), Some(json!(1)));
        assert_eq!(storage.keys(), vec!["a".to_string()]);
    }
}
