/*
 * Copyright 2024 Oxide Computer Company
 */

use crate::config::{LogFormat, LoggingConfig};
use crate::{Error, Result};

/**
 * Install a global subscriber.  RUST_LOG, when set, replaces the configured
 * filter.  Fails if a subscriber is already installed.
 */
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let res = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    res.map_err(|e| Error::Config(format!("initialising tracing: {e}")))
}
