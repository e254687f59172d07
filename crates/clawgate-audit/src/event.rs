//! Audit event shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use clawgate_core::{TenantId, Timestamp};

/// Log stream for events emitted by the approval side.
pub const AUTH_AGENT_STREAM: &str = "auth-agent";

/// `decision` value for an enforcement denial.
pub const DECISION_DENY: &str = "DENY";

/// `decision` value for a tool spotted in an agent response that the tenant
/// is not allowed to use.
pub const DECISION_RESPONSE_AUDIT: &str = "RESPONSE_AUDIT";

/// Outcome of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// The agent answered.
    Success,
    /// The invocation failed.
    Error,
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Events that can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// One round trip through the wrapped agent.
    AgentInvocation {
        /// Tenant the agent acted for.
        tenant_id: TenantId,
        /// Session identifier.
        session_id: String,
        /// Tools the agent used.
        tools_used: Vec<String>,
        /// Wall-clock duration.
        duration_ms: u64,
        /// Outcome.
        status: InvocationStatus,
    },

    /// A tool or resource check failed.
    PermissionDenied {
        /// Tenant that was denied.
        tenant_id: TenantId,
        /// Tool name, or `data_access` / `api_access` for resource checks.
        tool_name: String,
        /// [`DECISION_DENY`] or [`DECISION_RESPONSE_AUDIT`].
        decision: String,
        /// Path or endpoint for resource checks.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resource: Option<String>,
        /// Approval request raised for this denial, if any.
        #[serde(default)]
        request_id: Option<String>,
    },

    /// A pending approval request was resolved by a human.
    ApprovalDecision {
        /// Request that was resolved.
        request_id: String,
        /// Tenant that asked.
        tenant_id: TenantId,
        /// Resource that was asked for.
        resource: String,
        /// Decision as received, including unrecognised values.
        decision: String,
        /// Free-text note from the approver (empty if none).
        approver_note: String,
    },
}

impl AuditEvent {
    /// Stream this event belongs to.
    #[must_use]
    pub fn log_stream(&self) -> String {
        match self {
            Self::AgentInvocation { tenant_id, .. } | Self::PermissionDenied { tenant_id, .. } => {
                tenant_id.log_stream()
            },
            Self::ApprovalDecision { .. } => AUTH_AGENT_STREAM.to_string(),
        }
    }

    /// Serialized `event_type` discriminator.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AgentInvocation { .. } => "agent_invocation",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::ApprovalDecision { .. } => "approval_decision",
        }
    }

    /// Tenant the event concerns.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        match self {
            Self::AgentInvocation { tenant_id, .. }
            | Self::PermissionDenied { tenant_id, .. }
            | Self::ApprovalDecision { tenant_id, .. } => tenant_id,
        }
    }
}

/// A timestamped, stream-tagged audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339 time the event was recorded.
    pub timestamp: String,
    /// Destination stream.
    pub log_stream: String,
    /// Event body, flattened alongside `timestamp` and `log_stream`.
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditRecord {
    /// Wrap `event` with its stream and the given time.
    #[must_use]
    pub fn new(event: AuditEvent, at: Timestamp) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            log_stream: event.log_stream(),
            event,
        }
    }
}
