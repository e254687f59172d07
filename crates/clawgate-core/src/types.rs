//! Common types used throughout clawgate.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of the tenant on whose behalf the agent acts.
///
/// Tenant identity is supplied by the caller and never authenticated here;
/// it is the unit of isolation for tokens, profiles, and audit streams.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Audit log stream for events originating from this tenant.
    #[must_use]
    pub fn log_stream(&self) -> String {
        format!("tenant_{}", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a request ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    /// Accepts both the bare UUID and the `req:`-prefixed display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("req:").unwrap_or(raw);
        Uuid::parse_str(raw).map(Self)
    }
}

/// Unique identifier for an approval token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    /// Create a new random token ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

/// Timestamp wrapper for consistent handling throughout clawgate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current wall-clock timestamp.
    ///
    /// Components that need testable time take a [`Clock`](crate::Clock)
    /// instead of calling this directly.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Offset this timestamp by `delta`, saturating at the representable range.
    #[must_use]
    pub fn saturating_add(self, delta: TimeDelta) -> Self {
        Self(
            self.0
                .checked_add_signed(delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    /// Signed duration from `earlier` to `self`.
    #[must_use]
    pub fn since(&self, earlier: Timestamp) -> TimeDelta {
        self.0.signed_duration_since(earlier.0)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 rendering used in structured log records.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// Risk level shown to the human approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Read-only or public access.
    Low,
    /// File writes, code execution, or anything unrecognised.
    Medium,
    /// Shell access, system paths, or persistent non-tool grants.
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Kind of resource an approval request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A named agent tool (e.g. `shell`).
    Tool,
    /// A filesystem path prefix.
    DataPath,
    /// An external API endpoint.
    ApiEndpoint,
}

impl ResourceType {
    /// Human-readable label used in approval notifications.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::DataPath => "data path",
            Self::ApiEndpoint => "API endpoint",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool => write!(f, "tool"),
            Self::DataPath => write!(f, "data_path"),
            Self::ApiEndpoint => write!(f, "api_endpoint"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Ok(Self::Tool),
            "data_path" | "path" => Ok(Self::DataPath),
            "api_endpoint" | "api" => Ok(Self::ApiEndpoint),
            other => Err(format!(
                "unknown resource type '{other}'; expected tool, data_path, or api_endpoint"
            )),
        }
    }
}

/// Whether a grant should expire or become part of the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationType {
    /// Time-bounded grant backed by an approval token.
    #[default]
    Temporary,
    /// Permanent addition to the tenant's permission profile.
    Persistent,
}

impl fmt::Display for DurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary => write!(f, "temporary"),
            Self::Persistent => write!(f, "persistent"),
        }
    }
}

/// Lifecycle status of an approval request.
///
/// `Pending` is the only non-terminal state; every other variant is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting a human decision or the auto-reject timer.
    Pending,
    /// Granted (temporary or persistent).
    Approved,
    /// Refused by the approver, or an unrecognised decision.
    Rejected,
    /// Partially approved; recorded without an automatic grant.
    Partial,
    /// No decision arrived within the approval window.
    Timeout,
}

impl RequestStatus {
    /// Whether this status can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Partial => write!(f, "partial"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_log_stream() {
        let tenant = TenantId::new("acme");
        assert_eq!(tenant.log_stream(), "tenant_acme");
        assert_eq!(tenant.to_string(), "acme");
    }

    #[test]
    fn test_request_id_display_and_parse() {
        let id = RequestId::new();
        let display = id.to_string();
        assert!(display.starts_with("req:"));

        let parsed: RequestId = display.parse().unwrap();
        assert_eq!(parsed, id);

        let bare: RequestId = id.0.to_string().parse().unwrap();
        assert_eq!(bare, id);
    }

    #[test]
    fn test_request_id_parse_rejects_garbage() {
        assert!("req:not-a-uuid".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_token_id() {
        let id1 = TokenId::new();
        let id2 = TokenId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("token:"));
    }

    #[test]
    fn test_timestamp_saturating_add() {
        let ts = Timestamp::now();
        let later = ts.saturating_add(TimeDelta::hours(2));
        assert_eq!(later.since(ts), TimeDelta::hours(2));

        let max = Timestamp::from_datetime(DateTime::<Utc>::MAX_UTC);
        assert_eq!(max.saturating_add(TimeDelta::hours(1)), max);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "high");
    }

    #[test]
    fn test_resource_type_parse() {
        assert_eq!("tool".parse::<ResourceType>().unwrap(), ResourceType::Tool);
        assert_eq!(
            "DATA_PATH".parse::<ResourceType>().unwrap(),
            ResourceType::DataPath
        );
        assert_eq!(
            "api_endpoint".parse::<ResourceType>().unwrap(),
            ResourceType::ApiEndpoint
        );
        assert!("socket".parse::<ResourceType>().is_err());
    }

    #[test]
    fn test_resource_type_serde_matches_display() {
        let json = serde_json::to_string(&ResourceType::DataPath).unwrap();
        assert_eq!(json, "\"data_path\"");
        assert_eq!(ResourceType::DataPath.to_string(), "data_path");
    }

    #[test]
    fn test_request_status_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        for status in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Partial,
            RequestStatus::Timeout,
        ] {
            assert!(status.is_terminal());
        }
    }
}
