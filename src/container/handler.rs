//! Handler parameter resolution.
//!
//! `update` accepts plain closures; the parameter list of the closure is the
//! declaration of which session models it needs. Each parameter type
//! implements [`SessionParam`] and resolves itself against the container, in
//! declaration order:
//!
//! - `ModelRef<M>` is a required parameter. If no instance is cached or
//!   stored, a default instance is created and cached.
//! - `Option<ModelRef<M>>` is an optional parameter. If no instance is
//!   cached or stored, the handler receives `None` and nothing is created
//!   or cached.
//!
//! [`SessionArgs`] lifts parameter resolution over tuples, and
//! [`SessionHandler`] adapts closures of up to eight parameters, so call
//! sites read as ordinary multi-argument closures:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use session_stash::{MemoryStorage, ModelRef, SessionModel, SessionStash};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User { name: String }
//!
//! impl SessionModel for User {
//!     const KEY: &'static str = "User";
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Cart { items: Vec<String> }
//!
//! impl SessionModel for Cart {
//!     const KEY: &'static str = "Cart";
//! }
//!
//! # fn main() -> session_stash::Result<()> {
//! let mut stash = SessionStash::new(MemoryStorage::new());
//!
//! stash.update(|user: ModelRef<User>, cart: Option<ModelRef<Cart>>| {
//!     user.borrow_mut().name = "bob".to_string();
//!     assert!(cart.is_none());
//! })?;
//! # Ok(())
//! # }
//! ```

use crate::container::model::{ModelRef, SessionModel};
use crate::container::stash::SessionStash;
use crate::error::Result;
use crate::storage::SessionStorage;

/// A single handler parameter that can resolve itself from the container.
pub trait SessionParam: Sized {
    /// Resolve this parameter against the container's cache and storage.
    fn resolve<S: SessionStorage>(stash: &mut SessionStash<S>) -> Result<Self>;
}

/// Required parameter: resolves the cached instance, creating a default one
/// when neither the cache nor storage holds it.
impl<M: SessionModel> SessionParam for ModelRef<M> {
    fn resolve<S: SessionStorage>(stash: &mut SessionStash<S>) -> Result<Self> {
        match stash.fetch::<M>()? {
            Some(handle) => Ok(handle),
            None => Ok(stash.create::<M>()),
        }
    }
}

/// Optional parameter: resolves to `None` instead of creating anything.
impl<M: SessionModel> SessionParam for Option<ModelRef<M>> {
    fn resolve<S: SessionStorage>(stash: &mut SessionStash<S>) -> Result<Self> {
        stash.fetch::<M>()
    }
}

/// An ordered set of handler parameters, resolved left to right.
pub trait SessionArgs: Sized {
    /// Resolve every parameter in declaration order.
    fn resolve<S: SessionStorage>(stash: &mut SessionStash<S>) -> Result<Self>;
}

/// Adapter between closures and resolved argument tuples.
///
/// Implemented for closures of zero through eight [`SessionParam`]
/// parameters with any return type.
pub trait SessionHandler<Args> {
    /// The handler's return type, passed through `update` unchanged.
    type Output;

    /// Invoke the handler with the resolved arguments.
    fn call(self, args: Args) -> Self::Output;
}

macro_rules! impl_session_handler {
    ($($param:ident),*) => {
        impl<$($param: SessionParam),*> SessionArgs for ($($param,)*) {
            #[allow(unused_variables)]
            fn resolve<S: SessionStorage>(stash: &mut SessionStash<S>) -> Result<Self> {
                Ok(($($param::resolve(stash)?,)*))
            }
        }

        impl<Func, Out, $($param),*> SessionHandler<($($param,)*)> for Func
        where
            Func: FnOnce($($param),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn call(self, ($($param,)*): ($($param,)*)) -> Out {
                self($($param),*)
            }
        }
    };
}

impl_session_handler!();
impl_session_handler!(P1);
impl_session_handler!(P1, P2);
impl_session_handler!(P1, P2, P3);
impl_session_handler!(P1, P2, P3, P4);
impl_session_handler!(P1, P2, P3, P4, P5);
impl_session_handler!(P1, P2, P3, P4, P5, P6);
impl_session_handler!(P1, P2, P3, P4, P5, P6, P7);
impl_session_handler!(P1, P2, P3, P4, P5, P6, P7, P8);
