//! Interfaces to the systems this subsystem talks to but does not own.
//!
//! All calls are synchronous from the core's point of view. Implementations
//! that reach over the network should apply their own timeout policy; the
//! core never retries a failed call.

use tracing::info;

use crate::error::SecurityResult;
use crate::profile::PermissionProfile;
use crate::request::AgentOutcome;
use crate::types::TenantId;

/// Persistent store of per-tenant permission profiles.
pub trait ProfileStore: Send + Sync {
    /// Fetch the stored profile, or `None` if the tenant has none.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::Infrastructure`](crate::SecurityError::Infrastructure)
    /// if the backing store cannot be read.
    fn get(&self, tenant_id: &TenantId) -> SecurityResult<Option<PermissionProfile>>;

    /// Replace the tenant's profile.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::Infrastructure`](crate::SecurityError::Infrastructure)
    /// if the backing store cannot be written.
    fn put(&self, tenant_id: &TenantId, profile: &PermissionProfile) -> SecurityResult<()>;
}

/// Channel used to reach a human approver.
pub trait HumanApprovalChannel: Send + Sync {
    /// Deliver `text` to the approver responsible for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the message could not be sent.
    fn notify(&self, tenant_id: &TenantId, text: &str) -> SecurityResult<()>;
}

/// Informs the originating tenant session of an approval outcome.
pub trait AgentNotifier: Send + Sync {
    /// Deliver `outcome` to the session that raised the request.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the session could not be reached.
    fn notify(&self, outcome: &AgentOutcome) -> SecurityResult<()>;
}

/// Approval channel that only writes the notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingApprovalChannel;

impl HumanApprovalChannel for LoggingApprovalChannel {
    fn notify(&self, tenant_id: &TenantId, text: &str) -> SecurityResult<()> {
        info!(tenant_id = %tenant_id, message = text, "approval notification");
        Ok(())
    }
}

/// Agent notifier that only writes the outcome to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingAgentNotifier;

impl AgentNotifier for LoggingAgentNotifier {
    fn notify(&self, outcome: &AgentOutcome) -> SecurityResult<()> {
        info!(
            tenant_id = %outcome.tenant_id,
            request_id = %outcome.request_id,
            status = %outcome.status,
            reason = outcome.reason.as_deref().unwrap_or(""),
            "agent notified"
        );
        Ok(())
    }
}
