//! Approval tokens, approval requests, and agent-facing outcomes.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{
    DurationType, RequestId, RequestStatus, ResourceType, TenantId, Timestamp, TokenId,
};

/// A short-lived grant for one tenant to use one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalToken {
    /// Unique token identifier.
    pub token_id: TokenId,
    /// Tenant the grant belongs to.
    pub tenant_id: TenantId,
    /// Tool name or resource the grant covers.
    pub resource: String,
    /// When the token was minted.
    pub issued_at: Timestamp,
    /// When the token stops being valid.
    pub expires_at: Timestamp,
}

impl ApprovalToken {
    /// Whether the token has expired as of `now` (expiry instant inclusive).
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Lifetime the token was issued with.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.expires_at.since(self.issued_at)
    }
}

/// A pending human-reviewable ask to use a denied resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Tenant asking for the grant.
    pub tenant_id: TenantId,
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Tool name, path, or endpoint.
    pub resource: String,
    /// Free-text justification shown to the approver.
    pub reason: String,
    /// Whether the requester wants a temporary or persistent grant.
    pub duration_type: DurationType,
    /// Suggested lifetime in hours; only meaningful for temporary grants.
    pub suggested_duration_hours: Option<u32>,
    /// When the request was submitted.
    pub requested_at: Timestamp,
    /// Deadline after which the request auto-rejects.
    pub expires_at: Timestamp,
    /// Lifecycle status.
    pub status: RequestStatus,
}

impl ApprovalRequest {
    /// Default decision window before auto-reject.
    pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

    /// Create a pending temporary request with a one-hour suggestion.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        resource_type: ResourceType,
        resource: impl Into<String>,
    ) -> Self {
        let requested_at = Timestamp::now();
        Self {
            request_id: RequestId::new(),
            tenant_id,
            resource_type,
            resource: resource.into(),
            reason: "Permission required".to_string(),
            duration_type: DurationType::Temporary,
            suggested_duration_hours: Some(1),
            requested_at,
            expires_at: requested_at
                .saturating_add(TimeDelta::minutes(Self::DEFAULT_WINDOW_MINUTES)),
            status: RequestStatus::Pending,
        }
    }

    /// Set the justification text.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Ask for a temporary grant of `hours`.
    #[must_use]
    pub fn temporary(mut self, hours: Option<u32>) -> Self {
        self.duration_type = DurationType::Temporary;
        self.suggested_duration_hours = hours;
        self
    }

    /// Ask for a persistent grant.
    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.duration_type = DurationType::Persistent;
        self.suggested_duration_hours = None;
        self
    }

    /// Use a caller-supplied request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Re-anchor the decision window at `requested_at`.
    pub fn stamp(&mut self, requested_at: Timestamp, window: TimeDelta) {
        self.requested_at = requested_at;
        self.expires_at = requested_at.saturating_add(window);
    }
}

impl fmt::Display for ApprovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}={} ({})",
            self.request_id, self.tenant_id, self.resource_type, self.resource, self.status
        )
    }
}

/// Outcome status delivered to the originating agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A time-bounded token was issued.
    ApprovedTemporary,
    /// The tenant profile was extended.
    ApprovedPersistent,
    /// The approver refused, or the decision was unrecognised.
    Rejected,
    /// Partially approved; no automatic grant.
    Partial,
    /// Nobody answered within the window.
    Timeout,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApprovedTemporary => write!(f, "approved_temporary"),
            Self::ApprovedPersistent => write!(f, "approved_persistent"),
            Self::Rejected => write!(f, "rejected"),
            Self::Partial => write!(f, "partial"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// What the originating tenant session learns about its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Tenant that asked.
    pub tenant_id: TenantId,
    /// Request being answered.
    pub request_id: RequestId,
    /// Outcome.
    pub status: OutcomeStatus,
    /// Token issued for temporary approvals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<ApprovalToken>,
    /// Approver note, rejection reason, or timeout explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AgentOutcome {
    /// Create an outcome without a token or reason.
    #[must_use]
    pub fn new(tenant_id: TenantId, request_id: RequestId, status: OutcomeStatus) -> Self {
        Self {
            tenant_id,
            request_id,
            status,
            token: None,
            reason: None,
        }
    }

    /// Attach the issued token.
    #[must_use]
    pub fn with_token(mut self, token: ApprovalToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Attach a reason, skipping empty strings.
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty());
        self
    }
}
