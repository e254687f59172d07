//! Security error types for clawgate operations.

use thiserror::Error;

/// Errors shared across the authorization subsystem.
///
/// A permission denial is normally returned as a value by the enforcer; the
/// [`SecurityError::PermissionDenied`] variant exists for callers that need
/// to surface a denial through a `Result` chain.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The tenant lacks permission for the resource.
    #[error("permission denied: tenant={tenant_id} resource={resource} ({cause})")]
    PermissionDenied {
        /// Tenant that was denied.
        tenant_id: String,
        /// Tool name or resource that was denied.
        resource: String,
        /// Why the check failed.
        cause: String,
    },

    /// Input or content was rejected by the safety filter.
    #[error("safety violation in {field}: {reason}")]
    SafetyViolation {
        /// The field or input that failed screening.
        field: String,
        /// Reason for rejection.
        reason: String,
    },

    /// An external collaborator (profile store, notifier, audit sink) failed.
    #[error("{component} failure: {message}")]
    Infrastructure {
        /// Which collaborator failed.
        component: String,
        /// Underlying failure description.
        message: String,
    },

    /// A resolution carried a decision value nobody recognises.
    #[error("unknown approval decision: {0}")]
    UnknownDecision(String),
}

impl SecurityError {
    /// Convenience constructor for collaborator failures.
    #[must_use]
    pub fn infrastructure(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Infrastructure {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from an external collaborator.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Infrastructure { .. })
    }
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
