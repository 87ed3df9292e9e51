//! Tracing initialization.
//!
//! Installs a tracing-subscriber registry with an env filter and a fmt
//! layer. The engine itself only emits events; whether they go anywhere is
//! up to the application.

pub mod capture;

use crate::config::{LogFormat, TelemetryConfig};
use crate::error::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber was already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| Error::Config(format!("invalid log level {:?}: {e}", config.log_level)))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))
}
