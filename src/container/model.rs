//! Session model contract and the shared model handle.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An application value type held as a per-container singleton.
///
/// Session model types must be constructible without arguments (`Default`)
/// and must round-trip through serde; the container builds instances for you
/// on first required access and serializes whole instances at commit time
/// without interpreting their contents.
///
/// Keep as little information as possible in session models - do not keep
/// domain objects such as a full `User` record in the container; keep an
/// active `user_id` in a session model separate from your domain model.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use session_stash::SessionModel;
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct ActiveUser {
///     user_id: Option<u64>,
/// }
///
/// impl SessionModel for ActiveUser {
///     const KEY: &'static str = "ActiveUser";
/// }
/// ```
pub trait SessionModel: Default + Serialize + DeserializeOwned + 'static {
    /// Stable key identifying this model type.
    ///
    /// Serves as both the cache key and the storage key, so it must stay
    /// stable across builds and releases for persisted sessions to keep
    /// resolving. Two model types bound to the same key in one container
    /// collide at runtime.
    const KEY: &'static str;
}

/// Shared handle to a cached session model instance.
///
/// Handlers receive `ModelRef`s and mutate the singleton in place through
/// [`borrow_mut`](ModelRef::borrow_mut). Cloning the handle never clones the
/// model; all clones point at the same cached instance, and
/// [`ptr_eq`](ModelRef::ptr_eq) observes that identity.
///
/// Borrows are checked at runtime. Holding a borrow across a later container
/// call that serializes the same model (`commit`) panics, as with any
/// `RefCell`; keep borrows short-lived inside the handler.
pub struct ModelRef<M> {
    inner: Rc<RefCell<M>>,
}

impl<M> ModelRef<M> {
    pub(crate) fn new(model: M) -> Self {
        Self {
            inner: Rc::new(RefCell::new(model)),
        }
    }

    /// Immutably borrow the model.
    pub fn borrow(&self) -> Ref<'_, M> {
        self.inner.borrow()
    }

    /// Mutably borrow the model.
    pub fn borrow_mut(&self) -> RefMut<'_, M> {
        self.inner.borrow_mut()
    }

    /// Replace the model value, returning the previous one.
    pub fn set(&self, model: M) -> M {
        self.inner.replace(model)
    }

    /// Clone the current model value out of the handle.
    pub fn get(&self) -> M
    where
        M: Clone,
    {
        self.inner.borrow().clone()
    }

    /// Whether two handles point at the same cached instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<M> Clone for ModelRef<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for ModelRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.inner.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn test_borrow_mut_mutates_in_place() {
        let handle = ModelRef::new(Counter::default());
        handle.borrow_mut().hits = 3;
        assert_eq!(handle.borrow().hits, 3);
    }

    #[test]
    fn test_clone_shares_instance() {
        let a = ModelRef::new(Counter::default());
        let b = a.clone();

        b.borrow_mut().hits = 7;

        assert_eq!(a.borrow().hits, 7);
        assert!(ModelRef::ptr_eq(&a, &b));
    }

    #[test]
    fn test_distinct_handles_are_not_ptr_eq() {
        let a = ModelRef::new(Counter::default());
        let b = ModelRef::new(Counter::default());
        assert!(!ModelRef::ptr_eq(&a, &b));
    }

    #[test]
    fn test_set_returns_previous_value() {
        let handle = ModelRef::new(Counter { hits: 1 });
        let old = handle.set(Counter { hits: 2 });

        assert_eq!(old.hits, 1);
        assert_eq!(handle.get(), Counter { hits: 2 });
    }
}
