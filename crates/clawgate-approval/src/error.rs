use clawgate_audit::AuditError;
use clawgate_core::{RequestId, SecurityError};

/// Errors from enforcement and the approval workflow.
///
/// Denials are not errors; they come back as
/// [`Decision::Denied`](crate::Decision::Denied).
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// A collaborator (profile store, channel, notifier) failed.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// A request with this id is already pending.
    #[error("approval request {0} is already pending")]
    DuplicateRequest(RequestId),

    /// Writing an audit record failed.
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    /// The auto-reject timer could not be scheduled.
    #[error("scheduler unavailable: {0}")]
    Scheduler(String),
}

impl ApprovalError {
    /// Whether the failure came from an external collaborator.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        match self {
            Self::Security(e) => e.is_infrastructure(),
            Self::Audit(_) | Self::Scheduler(_) => true,
            Self::DuplicateRequest(_) => false,
        }
    }
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
