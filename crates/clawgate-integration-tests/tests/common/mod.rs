//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use clawgate_audit::{AuditLog, MemoryAuditSink};
use clawgate_config::Config;
use clawgate_core::{ProfileStore, TenantId};
use clawgate_gateway::{Authorization, Collaborators, Gatekeeper, RequestedGrant};
use clawgate_test::{
    ManualClock, MockProfileStore, RecordingAgentNotifier, RecordingApprovalChannel,
};

/// A gatekeeper wired to recording doubles and a manual clock.
pub struct GateHarness {
    /// The system under test.
    pub gate: Gatekeeper,
    /// Clock shared by tokens, requests, and audit records.
    pub clock: ManualClock,
    /// Backing profile store.
    pub profiles: MockProfileStore,
    /// Messages sent to the approver.
    pub channel: RecordingApprovalChannel,
    /// Outcomes sent back to the tenant.
    pub notifier: RecordingAgentNotifier,
    /// Every audit record emitted.
    pub sink: Arc<MemoryAuditSink>,
}

impl GateHarness {
    /// Harness over the built-in defaults.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Harness over `config`.
    pub fn with_config(config: &Config) -> Self {
        Self::with_store(config, MockProfileStore::new())
    }

    /// Harness over `config` with a pre-populated profile store.
    pub fn with_store(config: &Config, profiles: MockProfileStore) -> Self {
        let clock = ManualClock::new();
        let channel = RecordingApprovalChannel::new();
        let notifier = RecordingAgentNotifier::new();
        let sink = Arc::new(MemoryAuditSink::new());
        let collaborators =
            Collaborators::new(Arc::new(channel.clone()), Arc::new(notifier.clone()))
                .with_profile_store(Arc::new(profiles.clone()))
                .with_audit(AuditLog::with_clock(sink.clone(), Arc::new(clock.clone())))
                .with_clock(Arc::new(clock.clone()));
        let gate = Gatekeeper::from_config(config, collaborators).unwrap();
        Self {
            gate,
            clock,
            profiles,
            channel,
            notifier,
            sink,
        }
    }

    /// Ask for `tool` and return the pending request, panicking otherwise.
    pub fn escalate_tool(
        &self,
        tenant: &TenantId,
        tool: &str,
        requested: RequestedGrant,
    ) -> clawgate_core::RequestId {
        match self
            .gate
            .authorize_tool(tenant, tool, "integration test", requested)
            .unwrap()
        {
            Authorization::PendingApproval { request_id, .. } => request_id,
            other => panic!("expected escalation for {tool}, got {other:?}"),
        }
    }

    /// The tenant's stored profile, if any.
    pub fn stored_profile(&self, tenant: &TenantId) -> Option<clawgate_core::PermissionProfile> {
        self.profiles.get(tenant).unwrap()
    }
}
