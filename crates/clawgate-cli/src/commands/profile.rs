//! CLI handlers for `clawgate profile`.

use anyhow::{Context, Result};
use clawgate_core::{ResourceType, TenantId, Timestamp};
use clawgate_gateway::Gatekeeper;
use colored::Colorize;

use crate::theme::Theme;

/// Actor recorded on profiles edited from the command line.
const CLI_ACTOR: &str = "clawgate-cli";

/// Print the tenant's effective profile.
pub(crate) fn show_profile(gate: &Gatekeeper, tenant: &str, json: bool) -> Result<()> {
    let tenant_id = TenantId::new(tenant);
    let stored = gate.profiles().get(&tenant_id)?;
    let profile = gate.enforcer().profile_for(&tenant_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("\n{}", Theme::header(&format!("Profile for {tenant}")));
    println!("{}", Theme::separator());
    let origin = match (&stored, &profile.profile) {
        (Some(_), _) => "stored".to_string(),
        (None, Some(name)) => format!("default ({name})"),
        (None, None) => "default".to_string(),
    };
    println!("{}", Theme::kv("Source", &origin));
    print_list("Tools", profile.tools.iter());
    print_list("Data paths", profile.data_permissions.file_paths.iter());
    print_list("API endpoints", profile.data_permissions.api_endpoints.iter());
    if let (Some(at), Some(by)) = (&profile.updated_at, &profile.updated_by) {
        println!(
            "{}",
            Theme::kv("Updated", &format!("{} by {by}", at.to_rfc3339()))
        );
    }
    println!();
    Ok(())
}

fn print_list<'a>(label: &str, items: impl Iterator<Item = &'a String>) {
    let mut items = items.peekable();
    if items.peek().is_none() {
        println!("{}", Theme::kv(label, &Theme::dimmed("none")));
        return;
    }
    println!("{}", Theme::kv(label, ""));
    for item in items {
        println!("  - {}", item.cyan());
    }
}

/// Add a resource to the tenant's stored profile.
pub(crate) fn grant(
    gate: &Gatekeeper,
    tenant: &str,
    resource_type: &str,
    value: &str,
) -> Result<()> {
    let resource_type: ResourceType = resource_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let checked = match resource_type {
        ResourceType::Tool => gate.filter().validate_tool_name(value).map(|_| ()),
        ResourceType::DataPath | ResourceType::ApiEndpoint => {
            gate.filter().validate_resource_path(Some(value)).map(|_| ())
        },
    };
    checked.with_context(|| format!("refusing to grant {resource_type} '{value}'"))?;

    if resource_type == ResourceType::Tool && gate.enforcer().is_always_blocked(value) {
        anyhow::bail!("'{value}' is always blocked and cannot be granted");
    }

    let tenant_id = TenantId::new(tenant);
    let mut profile = gate
        .enforcer()
        .profile_for(&tenant_id)?
        .for_tenant(tenant_id.clone());

    let added = profile.grant(resource_type, value, CLI_ACTOR, Timestamp::now());

    gate.profiles()
        .put(&tenant_id, &profile)
        .with_context(|| format!("failed to store profile for {tenant}"))?;
    tracing::info!(
        tenant_id = %tenant_id,
        resource_type = %resource_type,
        resource = value,
        added,
        "profile updated from cli"
    );
    if added {
        println!(
            "{}",
            Theme::success(&format!("granted {resource_type} '{value}' to {tenant}"))
        );
    } else {
        println!(
            "{}",
            Theme::info(&format!("{tenant} already has {resource_type} '{value}'"))
        );
    }
    Ok(())
}
