//! Text sent to human approvers.

use std::time::Duration;

use clawgate_core::{ApprovalRequest, DurationType, RequestId, TenantId};

use crate::risk::RiskAssessment;

fn hours_label(hours: u32) -> String {
    if hours == 1 {
        "1 hour".to_string()
    } else {
        format!("{hours} hours")
    }
}

/// Render the approval prompt for `request`.
///
/// `hours` is the TTL a temporary approval would grant; `window_minutes` is
/// how long the approver has before the request auto-rejects.
#[must_use]
pub fn render_notification(
    request: &ApprovalRequest,
    assessment: &RiskAssessment,
    hours: u32,
    window_minutes: i64,
) -> String {
    let duration = match request.duration_type {
        DurationType::Temporary => format!("temporary ({})", hours_label(hours)),
        DurationType::Persistent => "persistent".to_string(),
    };
    [
        "Permission request".to_string(),
        String::new(),
        format!("Requester: {}", request.tenant_id),
        format!(
            "Resource: {} ({})",
            request.resource,
            request.resource_type.label()
        ),
        format!("Reason: {}", request.reason),
        format!("Suggested duration: {duration}"),
        format!("Risk level: {}", assessment.level.to_string().to_uppercase()),
        assessment.explanation.clone(),
        format!("Request ID: {}", request.request_id),
        String::new(),
        "Reply with one of:".to_string(),
        format!("  approve_temporary   grant for {}", hours_label(hours)),
        "  approve_persistent  add to the tenant's profile".to_string(),
        "  partial             record a partial approval".to_string(),
        "  reject              refuse the request".to_string(),
        String::new(),
        format!("No reply within {window_minutes} minutes will auto-reject."),
    ]
    .join("\n")
}

/// Reason given to the agent when a request times out.
#[must_use]
pub fn timeout_reason(window_minutes: i64) -> String {
    format!("no approval response within {window_minutes} minutes; request auto-rejected")
}

/// Notice sent to the approver when a request times out.
#[must_use]
pub fn render_timeout_notice(request: &ApprovalRequest, window_minutes: i64) -> String {
    format!(
        "Approval request {} from {} for {} ({}) expired after {window_minutes} minutes and was \
         auto-rejected.",
        request.request_id,
        request.tenant_id,
        request.resource,
        request.resource_type.label()
    )
}

/// One line of the pending-request listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSummary {
    /// 1-based position, oldest first.
    pub index: usize,
    /// Request id.
    pub request_id: RequestId,
    /// Requesting tenant.
    pub tenant_id: TenantId,
    /// Requested resource.
    pub resource: String,
    /// Time since the request was raised, never negative.
    pub waited: Duration,
    /// Time left before auto-reject, never negative.
    pub remaining: Duration,
}

/// Render the `/pending approvals` reply.
#[must_use]
pub fn format_pending_list(items: &[PendingSummary]) -> String {
    if items.is_empty() {
        return "No pending approval requests.".to_string();
    }
    let mut lines = vec![format!("Pending approval requests ({}):", items.len())];
    for item in items {
        lines.push(format!(
            "{}. {} | {} | {} | waited {}m | {}m remaining",
            item.index,
            item.request_id,
            item.tenant_id,
            item.resource,
            item.waited.as_secs() / 60,
            item.remaining.as_secs() / 60,
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawgate_core::{ResourceType, RiskLevel};

    fn shell_request() -> ApprovalRequest {
        ApprovalRequest::new(TenantId::new("acme"), ResourceType::Tool, "shell")
            .with_reason("run the test suite")
            .temporary(Some(2))
    }

    #[test]
    fn test_notification_contents() {
        let request = shell_request();
        let text = render_notification(
            &request,
            &RiskAssessment::for_level(RiskLevel::High),
            2,
            30,
        );
        assert!(text.contains("Requester: acme"));
        assert!(text.contains("Resource: shell (tool)"));
        assert!(text.contains("Reason: run the test suite"));
        assert!(text.contains("Suggested duration: temporary (2 hours)"));
        assert!(text.contains("Risk level: HIGH"));
        assert!(text.contains("strongly recommend temporary grants only"));
        assert!(text.contains(&request.request_id.to_string()));
        assert!(text.contains("approve_temporary   grant for 2 hours"));
        assert!(text.contains("approve_persistent"));
        assert!(text.contains("partial"));
        assert!(text.contains("reject"));
        assert!(text.ends_with("No reply within 30 minutes will auto-reject."));
    }

    #[test]
    fn test_notification_persistent_path() {
        let request = ApprovalRequest::new(TenantId::new("acme"), ResourceType::DataPath, "/srv")
            .persistent();
        let text = render_notification(
            &request,
            &RiskAssessment::for_level(RiskLevel::High),
            1,
            10,
        );
        assert!(text.contains("Resource: /srv (data path)"));
        assert!(text.contains("Suggested duration: persistent"));
        assert!(text.contains("grant for 1 hour\n"));
        assert!(text.contains("within 10 minutes"));
    }

    #[test]
    fn test_timeout_texts() {
        assert_eq!(
            timeout_reason(30),
            "no approval response within 30 minutes; request auto-rejected"
        );
        let request = shell_request();
        let notice = render_timeout_notice(&request, 30);
        assert!(notice.contains("acme"));
        assert!(notice.contains("shell"));
        assert!(notice.contains(&request.request_id.to_string()));
    }

    #[test]
    fn test_pending_list_empty() {
        assert_eq!(format_pending_list(&[]), "No pending approval requests.");
    }

    #[test]
    fn test_pending_list_lines() {
        let id = RequestId::new();
        let items = vec![PendingSummary {
            index: 1,
            request_id: id,
            tenant_id: TenantId::new("acme"),
            resource: "shell".to_string(),
            waited: Duration::from_secs(185),
            remaining: Duration::from_secs(1615),
        }];
        let text = format_pending_list(&items);
        assert!(text.starts_with("Pending approval requests (1):"));
        assert!(text.contains(&format!("1. {id} | acme | shell | waited 3m | 26m remaining")));
    }
}
