//! Error types for the gateway.

use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration could not be loaded or converted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Loading the layered configuration failed.
    #[error(transparent)]
    ConfigLoad(#[from] clawgate_config::ConfigError),

    /// The safety filter could not be built.
    #[error("safety filter error: {0}")]
    Safety(#[from] clawgate_safety::SafetyError),

    /// Enforcement or the approval workflow failed.
    #[error(transparent)]
    Approval(#[from] clawgate_approval::ApprovalError),

    /// A collaborator failed.
    #[error(transparent)]
    Security(#[from] clawgate_core::SecurityError),

    /// Audit emission failed.
    #[error("audit error: {0}")]
    Audit(#[from] clawgate_audit::AuditError),

    /// Logging could not be initialized.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] clawgate_telemetry::TelemetryError),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
