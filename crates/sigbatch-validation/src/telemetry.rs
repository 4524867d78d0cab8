//! Logging initialization.
//!
//! Sets up structured logging with tracing and optional JSON output.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global tracing subscriber.
///
/// Fails if the filter directive is malformed or a subscriber is already set.
pub fn init_telemetry(log_level: &str, json_format: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(log_level)?;

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init()?;
    }

    Ok(())
}

/// Install a global tracing subscriber from a [`LoggingConfig`].
pub fn init_from_config(config: &LoggingConfig) -> anyhow::Result<()> {
    init_telemetry(&config.level, config.json)
}
