//! Logging initialization helpers.
//!
//! The container logs cache state transitions at `debug`/`trace` level and
//! backend file activity at `debug` level. Applications embedding the crate
//! normally install their own subscriber; these helpers exist for examples
//! and tests.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "session_stash=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system, panicking if a subscriber is already set.
///
/// Filtering follows the `RUST_LOG` environment variable, falling back to
/// `session_stash=info`.
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Like [`init`], but returns `Err` instead of panicking when a subscriber
/// has already been installed.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
