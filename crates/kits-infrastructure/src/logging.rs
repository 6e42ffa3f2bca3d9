//! Process-wide tracing setup.

use kits_core::error::{KitsError, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global fmt subscriber.
///
/// Logs go to stderr so stdout stays free for the line protocol. `RUST_LOG`
/// overrides `default_filter`. Fails if a subscriber is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| KitsError::internal(format!("Failed to install logger: {}", e)))
}
