//! Logging setup and user-facing message helpers for the CLI.

use crate::Result;

use std::fmt::Display;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid RUST_LOG filter '{}': {}", directives, e))?,
        _ => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    Ok(())
}

/// Error text as shown to CLI users.
pub fn error_message(msg: impl Display) -> String {
    format!("batchjob-spec: {msg}")
}

pub fn warn(msg: impl Display) {
    tracing::warn!("{}", msg);
}
