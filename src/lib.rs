//! # session-stash
//!
//! Type-safe container for session model objects with deferred commit.
//!
//! This crate provides an in-process registry that lazily materializes
//! "session model" objects on first access, caches them for the duration of
//! a request scope, and defers all persistence to an explicit commit step.
//! Storage lives behind a small key/value adapter contract with an
//! in-memory implementation for tests and a process-native backend with a
//! session-file lifecycle.
//!
//! ## Features
//!
//! - **Typed singletons**: one instance per model type per container,
//!   created on demand from `Default`
//! - **Deferred commit**: handler mutations stay in-memory until `commit`
//!   flushes them in one batch
//! - **Tri-state cache**: "never loaded", "present", and "removed" are
//!   distinct, so removals and clears are visible before any commit
//! - **Pluggable storage**: adapters implement a three-method contract
//!
//! ## Quick Start
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use session_stash::{MemoryStorage, ModelRef, SessionModel, SessionStash};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! impl SessionModel for User {
//!     const KEY: &'static str = "User";
//! }
//!
//! fn main() -> session_stash::Result<()> {
//!     let mut stash = SessionStash::new(MemoryStorage::new());
//!
//!     // The handler's parameters declare the models it needs; a missing
//!     // required model is created for you.
//!     stash.update(|user: ModelRef<User>| {
//!         user.borrow_mut().name = "bob".to_string();
//!     })?;
//!
//!     // Nothing reaches storage until commit.
//!     stash.commit()?;
//!     Ok(())
//! }
//! ```

pub mod container;
pub mod error;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use container::{
    ModelRef, SessionArgs, SessionHandler, SessionModel, SessionParam, SessionStash,
};
pub use error::{Result, SessionStashError};
pub use storage::{MemoryStorage, NativeStorage, SessionBackend, SessionStorage};
