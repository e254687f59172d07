//! Approver decisions.

use std::fmt;
use std::str::FromStr;

/// What a human approver answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Issue a time-limited token.
    ApproveTemporary,
    /// Add the resource to the tenant's profile.
    ApprovePersistent,
    /// Refuse.
    Reject,
    /// Recorded as partial; no grant is made.
    Partial,
    /// Anything else, kept verbatim for the audit trail.
    Unknown(String),
}

impl ApprovalDecision {
    /// Parse an approver reply.
    ///
    /// Case, surrounding whitespace, and the separator between words
    /// (`_`, `-`, or spaces) are ignored. Never fails; unrecognised text
    /// becomes [`ApprovalDecision::Unknown`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let normalized = text
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        match normalized.as_str() {
            "approve_temporary" | "approve_temp" => Self::ApproveTemporary,
            "approve_persistent" | "approve_permanent" => Self::ApprovePersistent,
            "reject" | "deny" => Self::Reject,
            "partial" => Self::Partial,
            _ => Self::Unknown(text.trim().to_string()),
        }
    }

    /// Canonical wire name, or the raw text for [`ApprovalDecision::Unknown`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ApproveTemporary => "approve_temporary",
            Self::ApprovePersistent => "approve_persistent",
            Self::Reject => "reject",
            Self::Partial => "partial",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether this decision grants anything.
    #[must_use]
    pub fn is_grant(&self) -> bool {
        matches!(self, Self::ApproveTemporary | Self::ApprovePersistent)
    }
}

impl FromStr for ApprovalDecision {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
