//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur with audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Record could not be serialized.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The sink rejected or failed to write the record.
    #[error("audit sink error: {0}")]
    SinkError(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
