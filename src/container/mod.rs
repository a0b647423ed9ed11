//! Session model container.
//!
//! This module provides the typed container itself, the model contract and
//! handle types, and the handler parameter resolution machinery.

mod entry;
mod handler;
mod model;
mod stash;

pub use handler::{SessionArgs, SessionHandler, SessionParam};
pub use model::{ModelRef, SessionModel};
pub use stash::SessionStash;
