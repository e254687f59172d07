//! Mock implementations for testing.

use chrono::TimeDelta;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clawgate_core::{
    AgentNotifier, AgentOutcome, Clock, HumanApprovalChannel, PermissionProfile, ProfileStore,
    SecurityError, SecurityResult, TenantId, Timestamp,
};

/// Clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// pass another (as `Arc<dyn Clock>`) to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Timestamp::now())
    }

    /// Create a clock frozen at `ts`.
    #[must_use]
    pub fn at(ts: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(ts)),
        }
    }

    /// Jump to `ts`.
    pub fn set(&self, ts: Timestamp) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = ts;
        }
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = guard.saturating_add(delta);
        }
    }

    /// Move forward by whole hours.
    pub fn advance_hours(&self, hours: i64) {
        self.advance(TimeDelta::hours(hours));
    }

    /// Move forward by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(TimeDelta::minutes(minutes));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|e| *e.into_inner())
    }
}

/// In-memory profile store with switchable failures.
#[derive(Debug, Clone, Default)]
pub struct MockProfileStore {
    profiles: Arc<Mutex<HashMap<TenantId, PermissionProfile>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    puts: Arc<AtomicUsize>,
}

impl MockProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile for `tenant_id`.
    #[must_use]
    pub fn with_profile(self, tenant_id: impl Into<TenantId>, profile: PermissionProfile) -> Self {
        if let Ok(mut guard) = self.profiles.lock() {
            guard.insert(tenant_id.into(), profile);
        }
        self
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `put` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored profile for `tenant_id`.
    #[must_use]
    pub fn profile(&self, tenant_id: &TenantId) -> Option<PermissionProfile> {
        self.profiles
            .lock()
            .ok()
            .and_then(|guard| guard.get(tenant_id).cloned())
    }

    /// Number of successful `put` calls.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl ProfileStore for MockProfileStore {
    fn get(&self, tenant_id: &TenantId) -> SecurityResult<Option<PermissionProfile>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SecurityError::infrastructure(
                "profile store",
                "simulated read failure",
            ));
        }
        Ok(self.profile(tenant_id))
    }

    fn put(&self, tenant_id: &TenantId, profile: &PermissionProfile) -> SecurityResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SecurityError::infrastructure(
                "profile store",
                "simulated write failure",
            ));
        }
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| SecurityError::infrastructure("profile store", e.to_string()))?;
        guard.insert(tenant_id.clone(), profile.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Human approval channel that captures every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingApprovalChannel {
    messages: Arc<Mutex<Vec<(TenantId, String)>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingApprovalChannel {
    /// Create a channel with no captured messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `notify` fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All captured messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<(TenantId, String)> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Text of the most recent message.
    #[must_use]
    pub fn last_text(&self) -> Option<String> {
        self.messages().pop().map(|(_, text)| text)
    }

    /// Number of captured messages.
    #[must_use]
    pub fn count(&self) -> usize {
        self.messages.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl HumanApprovalChannel for RecordingApprovalChannel {
    fn notify(&self, tenant_id: &TenantId, text: &str) -> SecurityResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SecurityError::infrastructure(
                "approval channel",
                "simulated send failure",
            ));
        }
        if let Ok(mut guard) = self.messages.lock() {
            guard.push((tenant_id.clone(), text.to_string()));
        }
        Ok(())
    }
}

/// Agent notifier that captures every outcome.
#[derive(Debug, Clone, Default)]
pub struct RecordingAgentNotifier {
    outcomes: Arc<Mutex<Vec<AgentOutcome>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingAgentNotifier {
    /// Create a notifier with no captured outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `notify` fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All captured outcomes, oldest first.
    #[must_use]
    pub fn outcomes(&self) -> Vec<AgentOutcome> {
        self.outcomes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Most recent outcome.
    #[must_use]
    pub fn last(&self) -> Option<AgentOutcome> {
        self.outcomes().pop()
    }

    /// Number of captured outcomes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.outcomes.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl AgentNotifier for RecordingAgentNotifier {
    fn notify(&self, outcome: &AgentOutcome) -> SecurityResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SecurityError::infrastructure(
                "agent notifier",
                "simulated delivery failure",
            ));
        }
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(outcome.clone());
        }
        Ok(())
    }
}
