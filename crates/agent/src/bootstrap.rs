use thiserror::Error;
use tracing_subscriber::EnvFilter;

use cartwright_core::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter `{filter}`: {detail}")]
    InvalidFilter { filter: String, detail: String },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Installs the process-wide tracing subscriber from config. Call once at
/// startup; embedders that manage their own subscriber skip this.
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|error| {
        TelemetryError::InvalidFilter { filter: config.level.clone(), detail: error.to_string() }
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|_| TelemetryError::AlreadyInstalled)
}
