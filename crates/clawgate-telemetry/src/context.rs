//! Invocation context for timing and correlating one agent round trip.

use chrono::{DateTime, Utc};
use std::time::Instant;
use uuid::Uuid;

/// Context carried through a single agent invocation.
///
/// Created when a tenant's message arrives and consumed when the invocation
/// is audited, so `elapsed_ms` covers the whole round trip.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Tenant the agent acts for.
    pub tenant: String,
    /// Session identifier. Random unless supplied.
    pub session_id: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Wall-clock start, for display.
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl InvocationContext {
    /// Start timing an invocation for `tenant`.
    #[must_use]
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            session_id: Uuid::new_v4().to_string(),
            operation: None,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Set the session ID.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Milliseconds since the context was created, saturating at `u64::MAX`.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Create a tracing span with this context.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "invocation",
            tenant_id = %self.tenant,
            session_id = %self.session_id,
            operation = self.operation.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = InvocationContext::new("acme");
        assert_eq!(ctx.tenant, "acme");
        assert!(Uuid::parse_str(&ctx.session_id).is_ok());
        assert!(ctx.operation.is_none());
    }

    #[test]
    fn test_context_builder() {
        let ctx = InvocationContext::new("acme")
            .with_session_id("sess-42")
            .with_operation("chat");
        assert_eq!(ctx.session_id, "sess-42");
        assert_eq!(ctx.operation.as_deref(), Some("chat"));
    }

    #[test]
    fn test_elapsed() {
        let ctx = InvocationContext::new("acme");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }

    #[test]
    fn test_span_is_created() {
        let ctx = InvocationContext::new("acme").with_operation("chat");
        let span = ctx.span();
        let _guard = span.enter();
        tracing::info!("inside invocation");
    }
}
