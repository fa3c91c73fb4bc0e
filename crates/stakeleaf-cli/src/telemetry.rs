//! Logging initialization.
//!
//! Logs go to stderr so command output on stdout stays pipeable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set, otherwise `log_level`.
pub fn build_filter(log_level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", log_level, e)),
    }
}

/// Initialize logging.
pub fn init_telemetry(log_level: &str, json_format: bool) -> anyhow::Result<()> {
    let filter = build_filter(log_level)?;

    let result = if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
