//! Gatekeepers built from configuration files rather than code.

use std::sync::Arc;

use clawgate_approval::Grant;
use clawgate_config::Config;
use clawgate_core::{LoggingAgentNotifier, LoggingApprovalChannel, TenantId};
use clawgate_gateway::{Authorization, Collaborators, Gatekeeper, RequestedGrant};

fn logging_collaborators() -> Collaborators {
    Collaborators::new(
        Arc::new(LoggingApprovalChannel),
        Arc::new(LoggingAgentNotifier),
    )
}

#[test]
fn test_config_file_drives_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clawgate.toml");
    std::fs::write(
        &path,
        r#"
[policy]
default_profile = "analyst"

[profiles.analyst]
tools = ["web_search", "browser"]
file_paths = ["/srv/reports/*"]
api_endpoints = []
"#,
    )
    .unwrap();

    let home = tempfile::tempdir().unwrap();
    let resolved = Config::load_with_home(Some(&path), home.path()).unwrap();
    assert!(resolved.loaded_files.iter().any(|f| f.ends_with("clawgate.toml")));

    let gate = Gatekeeper::from_config(&resolved.config, logging_collaborators()).unwrap();
    let tenant = TenantId::new("acme");

    assert_eq!(
        gate.authorize_tool(&tenant, "browser", "", RequestedGrant::default())
            .unwrap(),
        Authorization::Allowed(Grant::Profile)
    );
    assert!(
        gate.authorize_data_path(&tenant, "/srv/reports/q3.csv", "", RequestedGrant::default())
            .unwrap()
            .is_allowed()
    );
    // Defaults still apply to untouched sections.
    assert_eq!(
        gate.authorize_tool(&tenant, "eval", "", RequestedGrant::default())
            .unwrap(),
        Authorization::Blocked
    );
}

#[test]
fn test_invalid_config_file_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[tokens]\nmax_ttl_hours = 48\n").unwrap();

    let home = tempfile::tempdir().unwrap();
    assert!(Config::load_with_home(Some(&path), home.path()).is_err());
}

#[tokio::test]
async fn test_persistent_grant_survives_restart_with_file_store() {
    let root = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.profile_root = Some(root.path().to_path_buf());
    config.storage.stack = "it".to_owned();
    let tenant = TenantId::new("acme");

    {
        let gate = Gatekeeper::from_config(&config, logging_collaborators()).unwrap();
        let Authorization::PendingApproval { request_id, .. } = gate
            .authorize_tool(&tenant, "shell", "deploy", RequestedGrant::Persistent)
            .unwrap()
        else {
            panic!("expected escalation");
        };
        gate.resolve(request_id, "approve_persistent", None).unwrap();
    }

    assert!(
        root.path()
            .join("it/tenants/acme/permissions.json")
            .is_file()
    );

    let gate = Gatekeeper::from_config(&config, logging_collaborators()).unwrap();
    assert_eq!(
        gate.authorize_tool(&tenant, "shell", "", RequestedGrant::default())
            .unwrap(),
        Authorization::Allowed(Grant::Profile)
    );
    assert!(gate.tokens().is_empty());
}
