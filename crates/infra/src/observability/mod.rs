//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level.

use clinisync_domain::{CliniSyncError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed.
///
/// # Errors
/// `CliniSyncError::Config` when the configured level is not a valid filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;

    let (json_layer, pretty_layer) = if config.json {
        (Some(fmt::layer().json().with_target(true).flatten_event(true)), None)
    } else {
        (None, Some(fmt::layer().with_target(true)))
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    Ok(installed)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.level.trim())
        .map_err(|e| CliniSyncError::Config(format!("Invalid log level '{}': {e}", config.level)))
}
