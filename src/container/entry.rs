//! Cache entry states and type-erased model slots.
//!
//! The container cache maps storage keys to [`CacheEntry`] values. A key
//! missing from the map means "never queried this scope" and is the only
//! state that triggers a storage read; the two explicit states below never
//! consult storage again.

use std::any::Any;

use serde_json::Value;

use crate::container::model::{ModelRef, SessionModel};
use crate::error::{Result, SessionStashError};

/// Cache state for one storage key that has been touched this scope.
pub(crate) enum CacheEntry {
    /// A live model instance, created or loaded during this scope.
    Present(Box<dyn ErasedSlot>),
    /// Removed, cleared, or looked up and found nothing. Resolves to no
    /// instance until a new one is created, and commits as a delete.
    Tombstoned,
}

/// Object-safe view of a typed slot, so the cache can hold models of
/// different types and `commit` can serialize them without knowing which.
pub(crate) trait ErasedSlot {
    /// Recover the concrete [`TypedSlot`] by downcast.
    fn as_any(&self) -> &dyn Any;

    /// Serialize the current model value to its stored representation.
    fn encode(&self) -> Result<Value>;
}

/// The monomorphized slot holding the handle for one model type.
pub(crate) struct TypedSlot<M: SessionModel> {
    handle: ModelRef<M>,
}

impl<M: SessionModel> TypedSlot<M> {
    pub(crate) fn new(handle: ModelRef<M>) -> Self {
        Self { handle }
    }

    /// A new handle to the slot's cached instance.
    pub(crate) fn handle(&self) -> ModelRef<M> {
        self.handle.clone()
    }
}

impl<M: SessionModel> ErasedSlot for TypedSlot<M> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn encode(&self) -> Result<Value> {
        serde_json::to_value(&*self.handle.borrow()).map_err(|source| SessionStashError::Encode {
            key: M::KEY.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct User {
        name: String,
    }

    impl SessionModel for User {
        const KEY: &'static str = "User";
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Cart {
        items: Vec<String>,
    }

    impl SessionModel for Cart {
        const KEY: &'static str = "Cart";
    }

    #[test]
    fn test_encode_reflects_current_value() {
        let handle = ModelRef::new(User::default());
        let slot = TypedSlot::new(handle.clone());

        handle.borrow_mut().name = "bob".to_string();

        assert_eq!(slot.encode().unwrap(), json!({ "name": "bob" }));
    }

    #[test]
    fn test_downcast_to_declared_type() {
        let slot: Box<dyn ErasedSlot> = Box::new(TypedSlot::new(ModelRef::new(User::default())));

        assert!(slot.as_any().downcast_ref::<TypedSlot<User>>().is_some());
    }

    #[test]
    fn test_downcast_to_other_type_fails() {
        let slot: Box<dyn ErasedSlot> = Box::new(TypedSlot::new(ModelRef::new(User::default())));

        assert!(slot.as_any().downcast_ref::<TypedSlot<Cart>>().is_none());
    }

    #[test]
    fn test_handle_shares_instance_with_slot() {
        let handle = ModelRef::new(Cart::default());
        let slot = TypedSlot::new(handle.clone());

        slot.handle().borrow_mut().items.push("apple".to_string());

        assert_eq!(handle.borrow().items, vec!["apple".to_string()]);
    }
}
