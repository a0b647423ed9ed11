//! Error types for session-stash.

use thiserror::Error;

/// Main error type for session-stash operations.
#[derive(Error, Debug)]
pub enum SessionStashError {
    /// Two session model types resolve to the same storage key.
    #[error("session model key collision: {key:?} is already bound to a different type")]
    KeyCollision {
        /// The contested storage key.
        key: String,
    },

    /// A session model could not be encoded for storage.
    #[error("failed to encode session model {key:?}: {source}")]
    Encode {
        /// Storage key of the model being written.
        key: String,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be decoded into the requested model type.
    #[error("failed to decode session model {key:?}: {source}")]
    Decode {
        /// Storage key of the model being read.
        key: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The session file could not be read or written as JSON.
    #[error("session file serialization: {0}")]
    SessionFile(#[source] serde_json::Error),

    /// I/O error from the storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for session-stash operations.
pub type Result<T> = std::result::Result<T, SessionStashError>;
