//! Approval workflow: pending registry, auto-reject timers, resolution.
//!
//! A submitted request waits in the pending registry until either a human
//! resolves it or its timer fires. Both paths begin by removing the request
//! from the registry under one lock acquisition; whichever removes it acts,
//! and the other finds nothing and returns. There is no separate status read
//! before acting.

use chrono::TimeDelta;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use clawgate_audit::{AuditEvent, AuditLog};
use clawgate_capabilities::{MAX_TOKEN_TTL_HOURS, TokenStore};
use clawgate_core::{
    AgentNotifier, AgentOutcome, ApprovalRequest, Clock, HumanApprovalChannel, OutcomeStatus,
    PermissionProfile, ProfileStore, RequestId, RequestStatus, SecurityError, SystemClock,
    TenantId, Timestamp,
};

use crate::decision::ApprovalDecision;
use crate::error::{ApprovalError, ApprovalResult};
use crate::notify::{
    PendingSummary, render_notification, render_timeout_notice, timeout_reason,
};
use crate::risk::{RiskAssessment, RiskCatalogue};

/// Actor recorded on profile updates made by a persistent approval.
pub const APPROVAL_ACTOR: &str = "auth-agent";

/// Decision text recorded when the timer resolves a request.
pub const TIMEOUT_DECISION: &str = "timeout";

/// Tunables for the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// How long a request may wait before auto-reject.
    pub window: Duration,
    /// TTL for temporary approvals when the request has no usable suggestion.
    pub default_ttl_hours: u32,
    /// Upper bound on temporary approval TTL.
    pub max_ttl_hours: u32,
    /// How many resolved request statuses are remembered for [`ApprovalWorkflow::status`].
    pub resolved_history: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(1800),
            default_ttl_hours: 1,
            max_ttl_hours: MAX_TOKEN_TTL_HOURS,
            resolved_history: 1024,
        }
    }
}

impl WorkflowSettings {
    /// The window as whole minutes.
    #[must_use]
    pub fn window_minutes(&self) -> i64 {
        i64::try_from(self.window.as_secs() / 60).unwrap_or(i64::MAX)
    }

    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX)
    }

    /// TTL a temporary approval of `request` grants.
    #[must_use]
    pub fn temporary_hours(&self, request: &ApprovalRequest) -> u32 {
        request
            .suggested_duration_hours
            .filter(|h| *h > 0)
            .unwrap_or(self.default_ttl_hours)
            .min(self.max_ttl_hours)
    }
}

/// Returned by [`ApprovalWorkflow::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Request id.
    pub request_id: RequestId,
    /// Text sent to the approver.
    pub notification: String,
    /// When the request auto-rejects.
    pub expires_at: Timestamp,
    /// Risk the approver was shown.
    pub risk: RiskAssessment,
}

struct PendingEntry {
    request: ApprovalRequest,
    timer: Option<AbortHandle>,
}

/// Bounded FIFO memory of terminal statuses.
#[derive(Debug, Default)]
struct ResolvedHistory {
    order: VecDeque<RequestId>,
    statuses: HashMap<RequestId, RequestStatus>,
}

impl ResolvedHistory {
    fn record(&mut self, request_id: RequestId, status: RequestStatus, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.statuses.insert(request_id, status).is_none() {
            self.order.push_back(request_id);
        }
        while self.order.len() > capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.statuses.remove(&evicted);
            }
        }
    }
}

struct Inner {
    pending: Mutex<HashMap<RequestId, PendingEntry>>,
    resolved: Mutex<ResolvedHistory>,
    /// Per-tenant locks held across a persistent grant's read-modify-write.
    profile_writes: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
    tokens: Arc<TokenStore>,
    profiles: Arc<dyn ProfileStore>,
    channel: Arc<dyn HumanApprovalChannel>,
    notifier: Arc<dyn AgentNotifier>,
    audit: AuditLog,
    clock: Arc<dyn Clock>,
    risk: RiskCatalogue,
    default_profile: PermissionProfile,
    settings: WorkflowSettings,
}

/// Builder for [`ApprovalWorkflow`].
pub struct WorkflowBuilder {
    tokens: Arc<TokenStore>,
    profiles: Arc<dyn ProfileStore>,
    channel: Arc<dyn HumanApprovalChannel>,
    notifier: Arc<dyn AgentNotifier>,
    audit: Option<AuditLog>,
    clock: Option<Arc<dyn Clock>>,
    risk: RiskCatalogue,
    default_profile: PermissionProfile,
    settings: WorkflowSettings,
}

impl WorkflowBuilder {
    /// Audit log for decision events. Defaults to the tracing sink.
    #[must_use]
    pub fn audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Clock for request timestamps. Timers always run on tokio time.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Risk catalogue used to phrase prompts.
    #[must_use]
    pub fn risk(mut self, risk: RiskCatalogue) -> Self {
        self.risk = risk;
        self
    }

    /// Profile a persistent approval starts from when the tenant has none stored.
    #[must_use]
    pub fn default_profile(mut self, profile: PermissionProfile) -> Self {
        self.default_profile = profile;
        self
    }

    /// Workflow tunables.
    #[must_use]
    pub fn settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the workflow.
    #[must_use]
    pub fn build(self) -> ApprovalWorkflow {
        ApprovalWorkflow {
            inner: Arc::new(Inner {
                pending: Mutex::new(HashMap::new()),
                resolved: Mutex::new(ResolvedHistory::default()),
                profile_writes: Mutex::new(HashMap::new()),
                tokens: self.tokens,
                profiles: self.profiles,
                channel: self.channel,
                notifier: self.notifier,
                audit: self.audit.unwrap_or_else(AuditLog::tracing),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                risk: self.risk,
                default_profile: self.default_profile,
                settings: self.settings,
            }),
        }
    }
}

/// Human-in-the-loop approval state machine.
///
/// Cheap to clone; clones share the pending registry.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    inner: Arc<Inner>,
}

impl ApprovalWorkflow {
    /// Start building a workflow around its collaborators.
    #[must_use]
    pub fn builder(
        tokens: Arc<TokenStore>,
        profiles: Arc<dyn ProfileStore>,
        channel: Arc<dyn HumanApprovalChannel>,
        notifier: Arc<dyn AgentNotifier>,
    ) -> WorkflowBuilder {
        WorkflowBuilder {
            tokens,
            profiles,
            channel,
            notifier,
            audit: None,
            clock: None,
            risk: RiskCatalogue::default(),
            default_profile: PermissionProfile::basic(),
            settings: WorkflowSettings::default(),
        }
    }

    /// Workflow tunables.
    #[must_use]
    pub fn settings(&self) -> &WorkflowSettings {
        &self.inner.settings
    }

    /// Register `request`, notify the approver, and arm the auto-reject timer.
    ///
    /// The request is re-stamped with the current time and the configured
    /// window. Must be called from inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::DuplicateRequest`] if the id is already pending
    /// - [`ApprovalError::Security`] if the approver could not be notified;
    ///   the request is not left pending
    /// - [`ApprovalError::Scheduler`] if there is no tokio runtime
    pub fn submit(&self, mut request: ApprovalRequest) -> ApprovalResult<SubmitReceipt> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ApprovalError::Scheduler(e.to_string()))?;

        let settings = &self.inner.settings;
        request.stamp(self.inner.clock.now(), settings.window_delta());
        request.status = RequestStatus::Pending;

        let risk = self.inner.risk.assess(&request);
        let notification = render_notification(
            &request,
            &risk,
            settings.temporary_hours(&request),
            settings.window_minutes(),
        );

        let request_id = request.request_id;
        let tenant_id = request.tenant_id.clone();
        let expires_at = request.expires_at;
        {
            let mut pending = self.pending();
            if pending.contains_key(&request_id) {
                return Err(ApprovalError::DuplicateRequest(request_id));
            }
            info!(
                request_id = %request_id,
                tenant_id = %tenant_id,
                resource = %request.resource,
                resource_type = %request.resource_type,
                risk = %risk.level,
                "approval request submitted"
            );
            pending.insert(
                request_id,
                PendingEntry {
                    request,
                    timer: None,
                },
            );
        }

        if let Err(e) = self.inner.channel.notify(&tenant_id, &notification) {
            error!(request_id = %request_id, error = %e, "approval notification failed");
            self.take(request_id);
            return Err(e.into());
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let window = settings.window;
        let task = handle.spawn(async move {
            tokio::time::sleep(window).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(e) = (ApprovalWorkflow { inner }).auto_reject(request_id) {
                error!(request_id = %request_id, error = %e, "auto-reject incomplete");
            }
        });

        if let Some(entry) = self.pending().get_mut(&request_id) {
            entry.timer = Some(task.abort_handle());
        } else {
            // Resolved while the approver was being notified.
            task.abort();
        }

        Ok(SubmitReceipt {
            request_id,
            notification,
            expires_at,
            risk,
        })
    }

    /// Apply a human decision.
    ///
    /// Returns the terminal status if this call resolved the request, or
    /// `None` if it was no longer pending (already resolved or timed out).
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::Security`] if the profile store or the agent
    ///   notifier failed
    /// - [`ApprovalError::Audit`] if the decision could not be audited
    ///
    /// The request is resolved regardless; a failed persistent grant is
    /// recorded as rejected. The first failure is returned.
    pub fn resolve(
        &self,
        request_id: RequestId,
        decision: &ApprovalDecision,
        note: Option<&str>,
    ) -> ApprovalResult<Option<RequestStatus>> {
        let Some(entry) = self.take(request_id) else {
            debug!(request_id = %request_id, "request already resolved, ignoring decision");
            return Ok(None);
        };
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        let request = entry.request;
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        let mut failure: Option<ApprovalError> = None;
        let (status, outcome) = match decision {
            ApprovalDecision::ApproveTemporary => {
                let hours = self.inner.settings.temporary_hours(&request);
                let token = self
                    .inner
                    .tokens
                    .issue(&request.tenant_id, &request.resource, hours);
                info!(
                    request_id = %request_id,
                    tenant_id = %request.tenant_id,
                    resource = %request.resource,
                    hours,
                    "temporary approval granted"
                );
                (
                    RequestStatus::Approved,
                    self.outcome(&request, OutcomeStatus::ApprovedTemporary)
                        .with_token(token)
                        .with_reason(note.map(ToString::to_string)),
                )
            },
            ApprovalDecision::ApprovePersistent => match self.grant_persistent(&request) {
                Ok(()) => {
                    info!(
                        request_id = %request_id,
                        tenant_id = %request.tenant_id,
                        resource = %request.resource,
                        "persistent approval granted"
                    );
                    (
                        RequestStatus::Approved,
                        self.outcome(&request, OutcomeStatus::ApprovedPersistent)
                            .with_reason(note.map(ToString::to_string)),
                    )
                },
                Err(e) => {
                    error!(request_id = %request_id, error = %e, "persistent grant failed");
                    let outcome = self
                        .outcome(&request, OutcomeStatus::Rejected)
                        .with_reason(Some(format!("persistent grant could not be saved: {e}")));
                    failure = Some(e.into());
                    (RequestStatus::Rejected, outcome)
                },
            },
            ApprovalDecision::Reject => {
                warn!(
                    request_id = %request_id,
                    tenant_id = %request.tenant_id,
                    resource = %request.resource,
                    "approval rejected"
                );
                (
                    RequestStatus::Rejected,
                    self.outcome(&request, OutcomeStatus::Rejected)
                        .with_reason(note.map(ToString::to_string)),
                )
            },
            ApprovalDecision::Partial => {
                info!(request_id = %request_id, "partial approval recorded, no grant issued");
                (
                    RequestStatus::Partial,
                    self.outcome(&request, OutcomeStatus::Partial)
                        .with_reason(note.map(ToString::to_string)),
                )
            },
            ApprovalDecision::Unknown(raw) => {
                error!(
                    request_id = %request_id,
                    decision = %raw,
                    "unrecognized approval decision, rejecting"
                );
                (
                    RequestStatus::Rejected,
                    self.outcome(&request, OutcomeStatus::Rejected)
                        .with_reason(Some(format!("unrecognized decision '{raw}'"))),
                )
            },
        };

        self.record_status(request_id, status);

        if let Err(e) = self.inner.notifier.notify(&outcome) {
            error!(request_id = %request_id, error = %e, "agent notification failed");
            failure.get_or_insert(e.into());
        }

        if let Err(e) = self.audit_decision(&request, decision.as_str(), note.unwrap_or("")) {
            failure.get_or_insert(e);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(Some(status)),
        }
    }

    /// Time out a request.
    ///
    /// Called by the timer armed in [`submit`](Self::submit). Returns whether
    /// this call resolved the request.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Audit`] if the timeout could not be audited.
    /// The request is timed out and both parties notified regardless.
    pub fn auto_reject(&self, request_id: RequestId) -> ApprovalResult<bool> {
        let Some(entry) = self.take(request_id) else {
            debug!(request_id = %request_id, "timer fired for resolved request");
            return Ok(false);
        };
        let request = entry.request;
        let minutes = self.inner.settings.window_minutes();

        warn!(
            request_id = %request_id,
            tenant_id = %request.tenant_id,
            resource = %request.resource,
            "approval request timed out, auto-rejecting"
        );
        self.record_status(request_id, RequestStatus::Timeout);

        let outcome = self
            .outcome(&request, OutcomeStatus::Timeout)
            .with_reason(Some(timeout_reason(minutes)));
        if let Err(e) = self.inner.notifier.notify(&outcome) {
            error!(request_id = %request_id, error = %e, "agent notification failed");
        }
        let notice = render_timeout_notice(&request, minutes);
        if let Err(e) = self.inner.channel.notify(&request.tenant_id, &notice) {
            error!(request_id = %request_id, error = %e, "timeout notice failed");
        }

        self.audit_decision(&request, TIMEOUT_DECISION, "")?;
        Ok(true)
    }

    /// Snapshot of pending requests, oldest first.
    #[must_use]
    pub fn list_pending(&self) -> Vec<PendingSummary> {
        let mut requests: Vec<ApprovalRequest> = self
            .pending()
            .values()
            .map(|entry| entry.request.clone())
            .collect();
        requests.sort_by_key(|r| r.requested_at);

        let now = self.inner.clock.now();
        requests
            .into_iter()
            .enumerate()
            .map(|(i, r)| PendingSummary {
                index: i.saturating_add(1),
                request_id: r.request_id,
                tenant_id: r.tenant_id,
                resource: r.resource,
                waited: clamp(now.since(r.requested_at)),
                remaining: clamp(r.expires_at.since(now)),
            })
            .collect()
    }

    /// Number of pending requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// A pending request by id.
    #[must_use]
    pub fn get_pending(&self, request_id: RequestId) -> Option<ApprovalRequest> {
        self.pending()
            .get(&request_id)
            .map(|entry| entry.request.clone())
    }

    /// Current status: `Pending`, a remembered terminal status, or `None` if
    /// the id is unknown or has aged out of the history.
    #[must_use]
    pub fn status(&self, request_id: RequestId) -> Option<RequestStatus> {
        if self.pending().contains_key(&request_id) {
            return Some(RequestStatus::Pending);
        }
        self.resolved().statuses.get(&request_id).copied()
    }

    fn take(&self, request_id: RequestId) -> Option<PendingEntry> {
        self.pending().remove(&request_id)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<RequestId, PendingEntry>> {
        self.inner.pending.lock().unwrap_or_else(|e| {
            warn!("pending registry lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn resolved(&self) -> MutexGuard<'_, ResolvedHistory> {
        self.inner.resolved.lock().unwrap_or_else(|e| {
            warn!("resolved history lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn record_status(&self, request_id: RequestId, status: RequestStatus) {
        let capacity = self.inner.settings.resolved_history;
        self.resolved().record(request_id, status, capacity);
    }

    fn outcome(&self, request: &ApprovalRequest, status: OutcomeStatus) -> AgentOutcome {
        AgentOutcome::new(request.tenant_id.clone(), request.request_id, status)
    }

    fn profile_lock(&self, tenant_id: &TenantId) -> Arc<Mutex<()>> {
        let mut locks = self.inner.profile_writes.lock().unwrap_or_else(|e| {
            warn!("profile lock table poisoned, recovering");
            e.into_inner()
        });
        Arc::clone(locks.entry(tenant_id.clone()).or_default())
    }

    fn grant_persistent(&self, request: &ApprovalRequest) -> Result<(), SecurityError> {
        let tenant_id = &request.tenant_id;
        let lock = self.profile_lock(tenant_id);
        let _writes = lock.lock().unwrap_or_else(|e| {
            warn!(tenant_id = %tenant_id, "profile write lock poisoned, recovering");
            e.into_inner()
        });
        let mut profile = match self.inner.profiles.get(tenant_id)? {
            Some(profile) => profile,
            None => self.inner.default_profile.clone(),
        };
        if profile.tenant_id.is_none() {
            profile.tenant_id = Some(tenant_id.clone());
        }
        let added = profile.grant(
            request.resource_type,
            &request.resource,
            APPROVAL_ACTOR,
            self.inner.clock.now(),
        );
        if !added {
            debug!(tenant_id = %tenant_id, resource = %request.resource, "already in profile");
        }
        self.inner.profiles.put(tenant_id, &profile)
    }

    fn audit_decision(
        &self,
        request: &ApprovalRequest,
        decision: &str,
        note: &str,
    ) -> ApprovalResult<()> {
        self.inner.audit.emit(AuditEvent::ApprovalDecision {
            request_id: request.request_id.to_string(),
            tenant_id: request.tenant_id.clone(),
            resource: request.resource.clone(),
            decision: decision.to_string(),
            approver_note: note.to_string(),
        })?;
        Ok(())
    }
}

fn clamp(delta: TimeDelta) -> Duration {
    delta.to_std().unwrap_or(Duration::ZERO)
}

impl fmt::Debug for ApprovalWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalWorkflow")
            .field("pending", &self.pending_count())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}
