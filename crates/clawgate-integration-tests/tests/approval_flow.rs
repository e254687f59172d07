//! Escalation through resolution, end to end through the gatekeeper.

mod common;

use chrono::TimeDelta;
use clawgate_approval::Grant;
use clawgate_audit::{AUTH_AGENT_STREAM, AuditEvent};
use clawgate_core::{OutcomeStatus, RequestStatus, TenantId};
use clawgate_gateway::{Authorization, RequestedGrant};
use common::GateHarness;

fn tenant() -> TenantId {
    TenantId::new("acme")
}

// ---------------------------------------------------------------------------
// Temporary approvals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_two_hour_approval_expires() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "shell", RequestedGrant::Temporary { hours: Some(2) });

    assert_eq!(
        h.gate.resolve(id, "approve_temporary", Some("ok for the build")).unwrap(),
        Some(RequestStatus::Approved)
    );

    let outcome = h.notifier.last().unwrap();
    assert_eq!(outcome.status, OutcomeStatus::ApprovedTemporary);
    let token = outcome.token.unwrap();
    assert_eq!(token.expires_at.since(token.issued_at), TimeDelta::hours(2));

    assert!(h.gate.tokens().validate(&tenant(), "shell"));
    assert_eq!(
        h.gate
            .authorize_tool(&tenant(), "shell", "", RequestedGrant::default())
            .unwrap(),
        Authorization::Allowed(Grant::Token)
    );

    h.clock.advance_hours(3);
    assert!(!h.gate.tokens().validate(&tenant(), "shell"));
    assert!(h.gate.tokens().is_empty());
    assert!(!h.gate.tokens().validate(&tenant(), "shell"));
}

#[tokio::test]
async fn test_requested_ttl_above_cap_is_clamped() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "browser", RequestedGrant::Temporary { hours: Some(72) });
    h.gate.resolve(id, "approve temporary", None).unwrap();

    let token = h.notifier.last().unwrap().token.unwrap();
    assert_eq!(token.expires_at.since(token.issued_at), TimeDelta::hours(24));
}

#[tokio::test]
async fn test_token_is_per_tenant() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "shell", RequestedGrant::default());
    h.gate.resolve(id, "approve_temporary", None).unwrap();

    let other = TenantId::new("globex");
    assert!(matches!(
        h.gate
            .authorize_tool(&other, "shell", "", RequestedGrant::default())
            .unwrap(),
        Authorization::PendingApproval { .. }
    ));
}

// ---------------------------------------------------------------------------
// Persistent approvals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_persistent_approval_extends_profile() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "browser", RequestedGrant::Persistent);

    assert_eq!(
        h.gate.resolve(id, "approve_persistent", None).unwrap(),
        Some(RequestStatus::Approved)
    );

    let stored = h.stored_profile(&tenant()).unwrap();
    assert!(stored.has_tool("browser"));
    assert!(stored.has_tool("web_search"));
    assert!(h.gate.tokens().is_empty());

    assert_eq!(
        h.gate
            .authorize_tool(&tenant(), "browser", "", RequestedGrant::default())
            .unwrap(),
        Authorization::Allowed(Grant::Profile)
    );
    assert!(h.gate.tool_constraint_prompt(&tenant()).starts_with(
        "Allowed tools for this session: browser, web_search."
    ));
}

#[tokio::test]
async fn test_persistent_data_path_grant() {
    let h = GateHarness::new();
    let auth = h
        .gate
        .authorize_data_path(&tenant(), "/data/reports", "quarterly numbers", RequestedGrant::Persistent)
        .unwrap();
    let Authorization::PendingApproval { request_id, .. } = auth else {
        panic!("expected escalation, got {auth:?}");
    };
    assert!(h.channel.last_text().unwrap().contains("/data/reports"));

    h.gate.resolve(request_id, "approve_persistent", None).unwrap();

    assert!(
        h.gate
            .authorize_data_path(&tenant(), "/data/reports/q3.csv", "", RequestedGrant::default())
            .unwrap()
            .is_allowed()
    );
}

// ---------------------------------------------------------------------------
// Rejections and odd replies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reject_grants_nothing_and_audits() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "shell", RequestedGrant::default());

    assert_eq!(
        h.gate.resolve(id, "reject", Some("not today")).unwrap(),
        Some(RequestStatus::Rejected)
    );
    assert!(h.gate.tokens().is_empty());

    let outcome = h.notifier.last().unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Rejected);
    assert_eq!(outcome.reason.as_deref(), Some("not today"));

    let decisions = h.sink.of_type("approval_decision");
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].log_stream, AUTH_AGENT_STREAM);
    assert!(matches!(
        &decisions[0].event,
        AuditEvent::ApprovalDecision { decision, approver_note, .. }
            if decision == "reject" && approver_note == "not today"
    ));
}

#[tokio::test]
async fn test_unknown_decision_closes_request() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "shell", RequestedGrant::default());

    assert_eq!(
        h.gate.resolve(id, "maybe later", None).unwrap(),
        Some(RequestStatus::Rejected)
    );
    assert_eq!(h.gate.workflow().pending_count(), 0);
    assert!(h.gate.tokens().is_empty());
    assert!(matches!(
        &h.sink.of_type("approval_decision")[0].event,
        AuditEvent::ApprovalDecision { decision, .. } if decision == "maybe later"
    ));

    // Already resolved.
    assert_eq!(h.gate.resolve(id, "approve_temporary", None).unwrap(), None);
}

#[tokio::test]
async fn test_partial_makes_no_grant() {
    let h = GateHarness::new();
    let id = h.escalate_tool(&tenant(), "shell", RequestedGrant::default());

    assert_eq!(
        h.gate.resolve(id, "partial", None).unwrap(),
        Some(RequestStatus::Partial)
    );
    assert_eq!(h.notifier.last().unwrap().status, OutcomeStatus::Partial);
    assert!(h.gate.tokens().is_empty());
    assert!(h.stored_profile(&tenant()).is_none());
}

// ---------------------------------------------------------------------------
// Pending list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_pending_approvals_command_tracks_registry() {
    let h = GateHarness::new();
    let first = h.escalate_tool(&tenant(), "shell", RequestedGrant::default());
    h.escalate_tool(&TenantId::new("globex"), "browser", RequestedGrant::default());

    let listing = h.gate.handle_command("/pending approvals").unwrap();
    assert!(listing.starts_with("Pending approval requests (2):"));
    assert!(listing.contains("shell"));
    assert!(listing.contains("globex"));

    h.gate.resolve(first, "reject", None).unwrap();
    let listing = h.gate.handle_command("pending approvals").unwrap();
    assert!(listing.starts_with("Pending approval requests (1):"));
    assert!(!listing.contains("shell"));
}
