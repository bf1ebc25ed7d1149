//! Process-wide tracing setup.

use tracing_subscriber::EnvFilter;

use crate::config::GeneralConfig;
use crate::error::{MemoError, Result};

/// Build the log filter: `RUST_LOG` wins, otherwise `fallback_level`.
pub fn env_filter(fallback_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level))
}

/// Install the global fmt subscriber.
///
/// Fails instead of panicking if a subscriber is already installed.
pub fn init(general: &GeneralConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&general.log_level))
        .try_init()
        .map_err(|e| MemoError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!(level = %general.log_level, "Tracing initialized");
    Ok(())
}
