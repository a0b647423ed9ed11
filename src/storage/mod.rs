//! Storage adapters for session data.
//!
//! This module defines the key/value contract the container persists
//! through, plus two implementations: an in-memory map for tests
//! ([`MemoryStorage`]) and a process-native backend that keeps serialized
//! session data in a request-scoped dataset with an explicit file lifecycle
//! ([`SessionBackend`] / [`NativeStorage`]).

mod memory;
mod native;

pub use memory::MemoryStorage;
pub use native::{NativeStorage, SessionBackend};

use serde_json::Value;

use crate::error::Result;

/// A namespaced key/value store for session data.
///
/// Where a backend is shared between containers, each adapter instance is
/// scoped to a namespace bound at construction; keys never leak across
/// namespaces. Values are structural JSON - how (or whether) an adapter
/// serializes them for its backend is its own concern and never constrains
/// the container.
pub trait SessionStorage {
    /// Return the stored value for `key`, or `None` if the key was never
    /// set or has been deleted. A missing key is not an error.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, overwriting any previous value. Storing
    /// `None` deletes the key.
    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()>;

    /// Delete every key in this adapter's namespace.
    fn clear(&mut self) -> Result<()>;
}
