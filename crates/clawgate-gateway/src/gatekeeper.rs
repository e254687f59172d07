//! The [`Gatekeeper`] facade.
//!
//! One value per process, built from a [`Config`] and the host's
//! collaborators. Every inbound message, tool call, and resolution goes
//! through it.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

use clawgate_approval::{
    ApprovalDecision, ApprovalWorkflow, Decision, DenialCause, Grant, PermissionEnforcer,
    format_pending_list,
};
use clawgate_audit::{
    AuditEvent, AuditLog, DECISION_RESPONSE_AUDIT, InvocationStatus, TracingAuditSink,
};
use clawgate_capabilities::TokenStore;
use clawgate_config::Config;
use clawgate_core::{
    AgentNotifier, ApprovalRequest, Clock, HumanApprovalChannel, PermissionProfile,
    ProfileStore, RequestId, RequestStatus, ResourceType, SystemClock, TenantId, Timestamp,
};
use clawgate_safety::{
    InMemoryMemoryStore, MemoryGate, MemoryStore, SafetyFilter, SafetyViolation,
};
use clawgate_telemetry::InvocationContext;

use crate::config_bridge;
use crate::error::GatewayResult;

/// Tools whose names are looked for in agent responses.
static RESPONSE_TOOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(shell|browser|file_write|code_execution|install_skill|load_extension|eval)\b",
    )
    .expect("invalid regex")
});

/// Chat commands answered with the pending approval list.
const PENDING_COMMANDS: &[&str] = &["/pending approvals", "pending approvals"];

const BLOCKED_TOOL_GUIDANCE: &str = "If the user requests an action that requires a blocked \
                                     tool, explain that you don't have permission and they \
                                     should contact their administrator.";

/// The grant an escalation asks the approver for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedGrant {
    /// Time-boxed; `None` lets the workflow pick its default.
    Temporary {
        /// Suggested hours.
        hours: Option<u32>,
    },
    /// Written into the tenant's profile.
    Persistent,
}

impl Default for RequestedGrant {
    fn default() -> Self {
        Self::Temporary { hours: Some(1) }
    }
}

/// Result of an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Proceed.
    Allowed(Grant),
    /// The resource is always blocked. No approval was requested.
    Blocked,
    /// The input failed safety screening.
    Rejected(SafetyViolation),
    /// A human has been asked.
    PendingApproval {
        /// The approval request.
        request_id: RequestId,
        /// When the request auto-rejects.
        expires_at: Timestamp,
    },
}

impl Authorization {
    /// Whether the caller may proceed now.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Host-supplied pieces of a [`Gatekeeper`].
pub struct Collaborators {
    channel: Arc<dyn HumanApprovalChannel>,
    notifier: Arc<dyn AgentNotifier>,
    profiles: Option<Arc<dyn ProfileStore>>,
    memory: Option<Arc<dyn MemoryStore>>,
    audit: Option<AuditLog>,
    clock: Option<Arc<dyn Clock>>,
}

impl Collaborators {
    /// The two collaborators with no sensible default.
    #[must_use]
    pub fn new(channel: Arc<dyn HumanApprovalChannel>, notifier: Arc<dyn AgentNotifier>) -> Self {
        Self {
            channel,
            notifier,
            profiles: None,
            memory: None,
            audit: None,
            clock: None,
        }
    }

    /// Override the profile store chosen from `[storage]`.
    #[must_use]
    pub fn with_profile_store(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Session memory backend. Defaults to process memory.
    #[must_use]
    pub fn with_memory_store(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Audit log. Defaults to the tracing sink.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Clock for tokens and request timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// Authorization front door.
pub struct Gatekeeper {
    filter: Arc<SafetyFilter>,
    tokens: Arc<TokenStore>,
    profiles: Arc<dyn ProfileStore>,
    enforcer: PermissionEnforcer,
    workflow: ApprovalWorkflow,
    memory: MemoryGate,
    audit: AuditLog,
    fallback_profile: PermissionProfile,
    known_tools: Vec<String>,
}

impl fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("known_tools", &self.known_tools)
            .field("pending", &self.workflow.pending_count())
            .field("tokens", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

impl Gatekeeper {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default profile is undefined or an extra
    /// memory pattern does not compile.
    pub fn from_config(config: &Config, collaborators: Collaborators) -> GatewayResult<Self> {
        let Collaborators {
            channel,
            notifier,
            profiles,
            memory,
            audit,
            clock,
        } = collaborators;

        let clock: Arc<dyn Clock> = clock.unwrap_or_else(|| Arc::new(SystemClock));
        let audit = audit.unwrap_or_else(|| {
            AuditLog::with_clock(Arc::new(TracingAuditSink), Arc::clone(&clock))
        });
        let profiles = profiles.unwrap_or_else(|| config_bridge::profile_store(config));
        let filter = Arc::new(config_bridge::safety_filter(config)?);
        let tokens = Arc::new(config_bridge::token_store(config, Arc::clone(&clock)));
        let default_profile = config_bridge::default_profile(config)?;

        let enforcer =
            PermissionEnforcer::new(Arc::clone(&profiles), Arc::clone(&tokens), audit.clone())
                .with_always_blocked(config.policy.always_blocked.iter().cloned())
                .with_default_profile(default_profile.clone());

        let workflow = ApprovalWorkflow::builder(
            Arc::clone(&tokens),
            Arc::clone(&profiles),
            channel,
            notifier,
        )
        .audit(audit.clone())
        .clock(clock)
        .risk(config_bridge::risk_catalogue(&config.risk))
        .default_profile(default_profile)
        .settings(config_bridge::workflow_settings(config))
        .build();

        let memory = MemoryGate::new(
            memory.unwrap_or_else(|| Arc::new(InMemoryMemoryStore::new())),
            Arc::clone(&filter),
        );

        // Advanced tools first, then the always-blocked set.
        let mut known_tools: Vec<String> = Vec::new();
        let advanced: Vec<String> = config.profiles.get("advanced").map_or_else(
            || PermissionProfile::advanced().tools.into_iter().collect(),
            |p| p.tools.clone(),
        );
        let always_blocked = config.policy.always_blocked.iter().cloned();
        for tool in advanced.into_iter().chain(always_blocked) {
            if !known_tools.contains(&tool) {
                known_tools.push(tool);
            }
        }

        info!(
            always_blocked = config.policy.always_blocked.len(),
            default_profile = %config.policy.default_profile,
            window_secs = config.approval.timeout_secs,
            "gatekeeper ready"
        );

        Ok(Self {
            filter,
            tokens,
            profiles,
            enforcer,
            workflow,
            memory,
            audit,
            fallback_profile: config_bridge::fallback_profile(config),
            known_tools,
        })
    }

    /// The safety filter.
    #[must_use]
    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    /// The token store.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The profile store.
    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    /// The enforcer.
    #[must_use]
    pub fn enforcer(&self) -> &PermissionEnforcer {
        &self.enforcer
    }

    /// The approval workflow.
    #[must_use]
    pub fn workflow(&self) -> &ApprovalWorkflow {
        &self.workflow
    }

    /// The session memory gate.
    #[must_use]
    pub fn memory(&self) -> &MemoryGate {
        &self.memory
    }

    /// Screen an inbound chat message.
    #[must_use]
    pub fn screen_inbound(&self, text: &str) -> String {
        self.filter.validate_message(text).to_string()
    }

    /// Authorize a tool, escalating to a human when the profile and tokens
    /// don't cover it.
    ///
    /// Must be called from inside a tokio runtime if escalation is possible.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator failed: the profile store, the
    /// audit sink while recording a denial, or the approver channel. Nothing
    /// is authorized in that case.
    pub fn authorize_tool(
        &self,
        tenant_id: &TenantId,
        tool_name: &str,
        reason: &str,
        requested: RequestedGrant,
    ) -> GatewayResult<Authorization> {
        if let Err(violation) = self.filter.validate_tool_name(tool_name) {
            warn!(tenant_id = %tenant_id, error = %violation, "tool name rejected");
            return Ok(Authorization::Rejected(violation));
        }
        let request_id = RequestId::new();
        let decision = self
            .enforcer
            .check_tool_with(tenant_id, tool_name, Some(request_id))?;
        self.settle(decision, tenant_id, ResourceType::Tool, tool_name, reason, requested, request_id)
    }

    /// Authorize a data path.
    ///
    /// # Errors
    ///
    /// See [`authorize_tool`](Self::authorize_tool).
    pub fn authorize_data_path(
        &self,
        tenant_id: &TenantId,
        path: &str,
        reason: &str,
        requested: RequestedGrant,
    ) -> GatewayResult<Authorization> {
        if let Err(violation) = self.filter.validate_resource_path(Some(path)) {
            warn!(tenant_id = %tenant_id, error = %violation, "resource path rejected");
            return Ok(Authorization::Rejected(violation));
        }
        let request_id = RequestId::new();
        let decision = self
            .enforcer
            .check_data_path_with(tenant_id, path, Some(request_id))?;
        self.settle(decision, tenant_id, ResourceType::DataPath, path, reason, requested, request_id)
    }

    /// Authorize an API endpoint.
    ///
    /// # Errors
    ///
    /// See [`authorize_tool`](Self::authorize_tool).
    pub fn authorize_api_endpoint(
        &self,
        tenant_id: &TenantId,
        endpoint: &str,
        reason: &str,
        requested: RequestedGrant,
    ) -> GatewayResult<Authorization> {
        if let Err(violation) = self.filter.validate_resource_path(Some(endpoint)) {
            warn!(tenant_id = %tenant_id, error = %violation, "endpoint rejected");
            return Ok(Authorization::Rejected(violation));
        }
        let request_id = RequestId::new();
        let decision = self
            .enforcer
            .check_api_endpoint_with(tenant_id, endpoint, Some(request_id))?;
        self.settle(
            decision,
            tenant_id,
            ResourceType::ApiEndpoint,
            endpoint,
            reason,
            requested,
            request_id,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn settle(
        &self,
        decision: Decision,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource: &str,
        reason: &str,
        requested: RequestedGrant,
        request_id: RequestId,
    ) -> GatewayResult<Authorization> {
        match decision {
            Decision::Allowed { grant } => Ok(Authorization::Allowed(grant)),
            Decision::Denied {
                cause: DenialCause::AlwaysBlocked,
            } => Ok(Authorization::Blocked),
            Decision::Denied {
                cause: DenialCause::NotInProfile,
            } => {
                let request = ApprovalRequest::new(tenant_id.clone(), resource_type, resource)
                    .with_request_id(request_id);
                let request = if reason.trim().is_empty() {
                    request
                } else {
                    request.with_reason(reason)
                };
                let request = match requested {
                    RequestedGrant::Temporary { hours } => request.temporary(hours),
                    RequestedGrant::Persistent => request.persistent(),
                };
                let receipt = self.workflow.submit(request)?;
                Ok(Authorization::PendingApproval {
                    request_id: receipt.request_id,
                    expires_at: receipt.expires_at,
                })
            },
        }
    }

    /// Apply an approver's reply.
    ///
    /// Returns `None` if the request was no longer pending.
    ///
    /// # Errors
    ///
    /// Returns an error if applying the decision hit a collaborator failure.
    pub fn resolve(
        &self,
        request_id: RequestId,
        decision_text: &str,
        note: Option<&str>,
    ) -> GatewayResult<Option<RequestStatus>> {
        let decision = ApprovalDecision::parse(decision_text);
        Ok(self.workflow.resolve(request_id, &decision, note)?)
    }

    /// Answer a chat command, if `text` is one.
    #[must_use]
    pub fn handle_command(&self, text: &str) -> Option<String> {
        let normalized = text.trim().to_lowercase();
        PENDING_COMMANDS
            .contains(&normalized.as_str())
            .then(|| format_pending_list(&self.workflow.list_pending()))
    }

    /// The tenant's profile, or the fallback profile if it can't be read.
    fn profile_or_fallback(&self, tenant_id: &TenantId) -> PermissionProfile {
        self.enforcer.profile_for(tenant_id).unwrap_or_else(|e| {
            warn!(tenant_id = %tenant_id, error = %e, "profile read failed, using fallback");
            self.fallback_profile.clone()
        })
    }

    /// Prompt text telling the agent which tools it may use.
    #[must_use]
    pub fn tool_constraint_prompt(&self, tenant_id: &TenantId) -> String {
        let profile = self.profile_or_fallback(tenant_id);
        let allowed: Vec<&str> = profile.tools.iter().map(String::as_str).collect();
        let blocked: Vec<&str> = self
            .known_tools
            .iter()
            .map(String::as_str)
            .filter(|t| !profile.has_tool(t))
            .collect();

        let allowed_line = format!("Allowed tools for this session: {}.", allowed.join(", "));
        if blocked.is_empty() {
            return allowed_line;
        }
        format!(
            "{allowed_line} You MUST NOT use these tools: {}. {BLOCKED_TOOL_GUIDANCE}",
            blocked.join(", ")
        )
    }

    /// Scan an agent response for tool names the tenant may not use.
    ///
    /// Each distinct offending tool is audited once. Returns them in order of
    /// first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Audit`](crate::GatewayError::Audit) on the
    /// first record the sink rejects.
    pub fn audit_response(
        &self,
        tenant_id: &TenantId,
        text: &str,
    ) -> GatewayResult<Vec<String>> {
        let profile = self.profile_or_fallback(tenant_id);
        let mut seen = BTreeSet::new();
        let mut flagged = Vec::new();

        for m in RESPONSE_TOOL_PATTERN.find_iter(text) {
            let tool = m.as_str().to_lowercase();
            if profile.has_tool(&tool) || !seen.insert(tool.clone()) {
                continue;
            }
            warn!(tenant_id = %tenant_id, tool_name = %tool, "disallowed tool named in response");
            self.audit.emit(AuditEvent::PermissionDenied {
                tenant_id: tenant_id.clone(),
                tool_name: tool.clone(),
                decision: DECISION_RESPONSE_AUDIT.to_string(),
                resource: None,
                request_id: None,
            })?;
            flagged.push(tool);
        }
        Ok(flagged)
    }

    /// Audit one completed agent invocation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Audit`](crate::GatewayError::Audit) if the
    /// sink failed.
    pub fn record_invocation(
        &self,
        ctx: &InvocationContext,
        tools_used: &[String],
        status: InvocationStatus,
    ) -> GatewayResult<()> {
        self.audit.emit(AuditEvent::AgentInvocation {
            tenant_id: TenantId::new(ctx.tenant.clone()),
            session_id: ctx.session_id.clone(),
            tools_used: tools_used.to_vec(),
            duration_ms: ctx.elapsed_ms(),
            status,
        })?;
        Ok(())
    }
}
