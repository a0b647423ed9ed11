//! The session container state machine.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::container::entry::{CacheEntry, TypedSlot};
use crate::container::handler::{SessionArgs, SessionHandler};
use crate::container::model::{ModelRef, SessionModel};
use crate::error::{Result, SessionStashError};
use crate::storage::SessionStorage;

/// A type-safe container for session model objects.
///
/// The container wraps one storage adapter and lazily materializes model
/// instances on first access: a required model that exists in storage is
/// deserialized and cached, and one that does not is default-constructed.
/// Each model type is a singleton within the container - if you need several
/// instances of something, keep them in a collection inside one model.
///
/// All mutations (handler edits, [`remove`](SessionStash::remove),
/// [`clear`](SessionStash::clear)) are visible to later calls on the same
/// container immediately, but nothing reaches the storage adapter until
/// [`commit`](SessionStash::commit).
///
/// The container is single-threaded and exclusively owned for its scope,
/// typically one request; construct it at scope start and commit at scope
/// end.
pub struct SessionStash<S> {
    storage: S,
    cache: HashMap<String, CacheEntry>,
    pending_clear: bool,
}

impl<S: SessionStorage> SessionStash<S> {
    /// Create a container bound to a storage adapter.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cache: HashMap::new(),
            pending_clear: false,
        }
    }

    /// Access one or more session model objects.
    ///
    /// The handler's parameter list declares which models it needs; see
    /// [`SessionParam`](crate::SessionParam) for the required/optional
    /// forms. Parameters resolve in declaration order, then the handler runs
    /// and its return value is passed through unchanged.
    ///
    /// # Errors
    ///
    /// Fails if resolving a parameter fails: a storage read error, a decode
    /// error for a stored value, or a key collision.
    pub fn update<F, Args>(&mut self, handler: F) -> Result<F::Output>
    where
        Args: SessionArgs,
        F: SessionHandler<Args>,
    {
        let args = Args::resolve(self)?;
        Ok(handler.call(args))
    }

    /// Read-only access to the cached or stored instance of `M`.
    ///
    /// On the first call for `M` in this container's lifetime the storage
    /// adapter is consulted and the result cached; later calls return the
    /// cached state without touching storage again. Returns `None` for
    /// models that are absent from storage, removed, or cleared. Never
    /// creates an instance.
    pub fn fetch<M: SessionModel>(&mut self) -> Result<Option<ModelRef<M>>> {
        if let Some(entry) = self.cache.get(M::KEY) {
            return match entry {
                CacheEntry::Tombstoned => Ok(None),
                CacheEntry::Present(slot) => slot
                    .as_any()
                    .downcast_ref::<TypedSlot<M>>()
                    .map(|slot| Some(slot.handle()))
                    .ok_or_else(|| SessionStashError::KeyCollision {
                        key: M::KEY.to_string(),
                    }),
            };
        }

        // First lookup for this key. A pending clear makes storage look
        // empty until commit has actually wiped it.
        let stored = if self.pending_clear {
            None
        } else {
            self.storage.get(M::KEY)?
        };

        match stored {
            Some(value) => {
                let model: M =
                    serde_json::from_value(value).map_err(|source| SessionStashError::Decode {
                        key: M::KEY.to_string(),
                        source,
                    })?;
                debug!("loaded session model {} from storage", M::KEY);
                Ok(Some(self.insert(model)))
            }
            None => {
                trace!("no stored value for session model {}", M::KEY);
                self.cache
                    .insert(M::KEY.to_string(), CacheEntry::Tombstoned);
                Ok(None)
            }
        }
    }

    /// Create a default instance of `M` and cache it as present.
    pub(crate) fn create<M: SessionModel>(&mut self) -> ModelRef<M> {
        debug!("created session model {}", M::KEY);
        self.insert(M::default())
    }

    fn insert<M: SessionModel>(&mut self, model: M) -> ModelRef<M> {
        let handle = ModelRef::new(model);
        self.cache.insert(
            M::KEY.to_string(),
            CacheEntry::Present(Box::new(TypedSlot::new(handle.clone()))),
        );
        handle
    }

    /// Remove the session model of type `M` from this container.
    ///
    /// The removal is visible to later `update`/`fetch` calls immediately,
    /// but storage is untouched until [`commit`](SessionStash::commit).
    pub fn remove<M: SessionModel>(&mut self) {
        self.remove_key(M::KEY);
    }

    /// Remove the session model a live handle points at.
    ///
    /// Equivalent to [`remove::<M>()`](SessionStash::remove) with the
    /// handle's model type.
    pub fn remove_model<M: SessionModel>(&mut self, _model: &ModelRef<M>) {
        self.remove_key(M::KEY);
    }

    /// Remove a session model by its raw storage key.
    pub fn remove_key(&mut self, key: &str) {
        debug!("tombstoned session model {}", key);
        self.cache.insert(key.to_string(), CacheEntry::Tombstoned);
    }

    /// Destroy all session models in this container.
    ///
    /// Every key touched so far is tombstoned, and storage is treated as
    /// empty for keys not yet touched, so the wipe is fully visible to later
    /// `update`/`fetch` calls before any commit. The storage adapter itself
    /// is only wiped by the next [`commit`](SessionStash::commit).
    pub fn clear(&mut self) {
        for entry in self.cache.values_mut() {
            *entry = CacheEntry::Tombstoned;
        }
        self.pending_clear = true;
        debug!("cleared session container ({} entries)", self.cache.len());
    }

    /// Commit all changes made to models in this container.
    ///
    /// Issues a full namespace wipe first when a [`clear`](SessionStash::clear)
    /// is pending, then writes every cache entry: present models are
    /// serialized and stored, tombstoned keys are deleted. The cache itself
    /// is left as is, so committing again without intervening changes
    /// re-issues the same writes.
    ///
    /// # Errors
    ///
    /// Storage and serialization failures propagate unmodified. Writes
    /// already issued before a failure are not rolled back.
    pub fn commit(&mut self) -> Result<()> {
        debug!(
            "committing {} cache entries (pending clear: {})",
            self.cache.len(),
            self.pending_clear
        );

        if self.pending_clear {
            self.storage.clear()?;
        }

        for (key, entry) in &self.cache {
            let value = match entry {
                CacheEntry::Present(slot) => Some(slot.encode()?),
                CacheEntry::Tombstoned => None,
            };
            self.storage.set(key, value)?;
        }

        self.pending_clear = false;
        Ok(())
    }

    /// The bound storage adapter.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the container, returning the bound storage adapter.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
