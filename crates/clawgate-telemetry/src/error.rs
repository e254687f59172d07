//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing the logging pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Bad level, directive, or format name.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber was already installed.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Log directory could not be created.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
