//! Logging initialization.
//!
//! Builds the `tracing` subscriber from the `logging` config section:
//! the level maps to an `EnvFilter` directive, and an optional log file
//! gets its own plain-text layer alongside stdout.

use anyhow::Context;
use std::sync::Arc;
use syncguard_config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once at boot.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log level {:?}", config.level))?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {:?}", path))?;

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .try_init()
                .context("logging already initialized")?;
        }
        None => {
            registry.try_init().context("logging already initialized")?;
        }
    }

    Ok(())
}
