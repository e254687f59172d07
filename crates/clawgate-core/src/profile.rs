//! Per-tenant permission profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{ResourceType, TenantId, Timestamp};

/// Data-access allow-lists carried by a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPermissions {
    /// Allow-prefixes for filesystem paths (`/data/*` style entries).
    pub file_paths: Vec<String>,
    /// Allowed API endpoints.
    pub api_endpoints: Vec<String>,
}

/// The static allow-list of tools and data paths for a tenant.
///
/// Built-in profiles (`basic`, `advanced`) carry no tenant and serve as the
/// fallback when the profile store has nothing for a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionProfile {
    /// Name of the built-in profile this was derived from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Tenant this profile belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    /// Tools the tenant may invoke.
    pub tools: BTreeSet<String>,
    /// Data-path and endpoint allow-lists.
    pub data_permissions: DataPermissions,
    /// When the profile was last modified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Who last modified the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl PermissionProfile {
    /// Create a named profile with the given tools and empty data permissions.
    #[must_use]
    pub fn named<I, S>(name: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profile: Some(name.into()),
            tools: tools.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The `basic` built-in profile: web search only.
    #[must_use]
    pub fn basic() -> Self {
        Self::named("basic", ["web_search"])
    }

    /// The `advanced` built-in profile.
    #[must_use]
    pub fn advanced() -> Self {
        Self::named(
            "advanced",
            [
                "web_search",
                "shell",
                "browser",
                "file",
                "file_write",
                "code_execution",
            ],
        )
    }

    /// Bind this profile to a tenant.
    #[must_use]
    pub fn for_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Add a file-path allow-prefix.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.data_permissions.file_paths.push(path.into());
        self
    }

    /// Add an allowed API endpoint.
    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.data_permissions.api_endpoints.push(endpoint.into());
        self
    }

    /// Whether the tool set contains `tool`.
    #[must_use]
    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.contains(tool)
    }

    /// Append `resource` to the list matching `resource_type` and stamp the
    /// update with `actor` and `at`.
    ///
    /// The stamp is applied even when the resource is already present, so a
    /// re-approval is still attributed. Returns whether the resource was new.
    pub fn grant(
        &mut self,
        resource_type: ResourceType,
        resource: &str,
        actor: &str,
        at: Timestamp,
    ) -> bool {
        let added = match resource_type {
            ResourceType::Tool => self.tools.insert(resource.to_string()),
            ResourceType::DataPath => push_unique(&mut self.data_permissions.file_paths, resource),
            ResourceType::ApiEndpoint => {
                push_unique(&mut self.data_permissions.api_endpoints, resource)
            },
        };
        self.updated_at = Some(at);
        self.updated_by = Some(actor.to_string());
        added
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}
