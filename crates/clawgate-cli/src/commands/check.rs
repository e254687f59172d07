//! CLI handlers for `clawgate check`.
//!
//! Asks the enforcer directly, so a denial is reported but never escalated.

use anyhow::Result;
use clawgate_approval::{Decision, DenialCause, Grant, RiskCatalogue};
use clawgate_core::{ApprovalRequest, ResourceType, TenantId};
use clawgate_gateway::Gatekeeper;

use crate::theme::Theme;

/// Report the enforcer's decision for a tool.
pub(crate) fn check_tool(
    gate: &Gatekeeper,
    risk: &RiskCatalogue,
    tenant: &str,
    tool: &str,
) -> Result<()> {
    if let Err(violation) = gate.filter().validate_tool_name(tool) {
        println!("{}", Theme::error(&violation.to_string()));
        return Ok(());
    }
    let tenant_id = TenantId::new(tenant);
    let decision = gate.enforcer().check_tool(&tenant_id, tool)?;
    print_decision(&decision, risk, &tenant_id, ResourceType::Tool, tool);
    Ok(())
}

/// Report the enforcer's decision for a data path.
pub(crate) fn check_path(
    gate: &Gatekeeper,
    risk: &RiskCatalogue,
    tenant: &str,
    path: &str,
) -> Result<()> {
    if let Err(violation) = gate.filter().validate_resource_path(Some(path)) {
        println!("{}", Theme::error(&violation.to_string()));
        return Ok(());
    }
    let tenant_id = TenantId::new(tenant);
    let decision = gate.enforcer().check_data_path(&tenant_id, path)?;
    print_decision(&decision, risk, &tenant_id, ResourceType::DataPath, path);
    Ok(())
}

fn print_decision(
    decision: &Decision,
    risk: &RiskCatalogue,
    tenant_id: &TenantId,
    resource_type: ResourceType,
    resource: &str,
) {
    println!("{}", describe(decision));
    if decision.is_escalatable() {
        let request = ApprovalRequest::new(tenant_id.clone(), resource_type, resource);
        let assessment = risk.assess(&request);
        println!(
            "  {}",
            Theme::kv("Approval risk", &Theme::risk_level(assessment.level))
        );
        println!("  {}", Theme::dimmed(&assessment.explanation));
    }
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Allowed {
            grant: Grant::Profile,
        } => Theme::success("allowed by profile"),
        Decision::Allowed {
            grant: Grant::Token,
        } => Theme::success("allowed by approval token"),
        Decision::Denied {
            cause: DenialCause::AlwaysBlocked,
        } => Theme::error("always blocked"),
        Decision::Denied {
            cause: DenialCause::NotInProfile,
        } => Theme::warning("not in profile, requires approval"),
    }
}
