//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::error::DisError;
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber
///
/// `RUST_LOG` overrides `config.log_level` when set. Returns `Ok(false)` without
/// changing anything if a global subscriber is already installed.
///
/// # Errors
///
/// Returns `ConfigurationError` if the log level is invalid.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, DisError> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    Ok(installed.is_ok())
}
