//! Permission enforcement.
//!
//! The [`PermissionEnforcer`] answers one question per call: may this tenant
//! use this tool, path, or endpoint right now?
//!
//! # Check Order
//!
//! 1. Is the tool in the always-blocked set? -> `Denied(AlwaysBlocked)`
//! 2. Does the tenant's profile (or the default profile) cover it? -> `Allowed(Profile)`
//! 3. Is there a live approval token for it? -> `Allowed(Token)`
//! 4. Otherwise -> `Denied(NotInProfile)`, with a `permission_denied` audit event
//!
//! Step 1 only applies to tools. Nothing in steps 2 or 3 can lift it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use clawgate_audit::{AuditEvent, AuditLog, DECISION_DENY};
use clawgate_capabilities::TokenStore;
use clawgate_core::{PermissionProfile, ProfileStore, RequestId, TenantId, normalize_prefix};

use crate::error::ApprovalResult;

/// Tools no profile or token can unlock.
pub const ALWAYS_BLOCKED_TOOLS: &[&str] = &["install_skill", "load_extension", "eval"];

/// `tool_name` recorded for data-path denials.
pub const DATA_ACCESS_TOOL: &str = "data_access";

/// `tool_name` recorded for API endpoint denials.
pub const API_ACCESS_TOOL: &str = "api_access";

/// What authorized an allowed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The tenant's profile lists the resource.
    Profile,
    /// A live approval token covers the resource.
    Token,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::Token => write!(f, "approval token"),
        }
    }
}

/// Why a check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialCause {
    /// The tool is in the always-blocked set. No approval can lift this.
    AlwaysBlocked,
    /// Neither the profile nor a token covers the resource.
    NotInProfile,
}

impl fmt::Display for DenialCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysBlocked => write!(f, "always blocked"),
            Self::NotInProfile => write!(f, "not permitted by profile"),
        }
    }
}

/// Result of an enforcement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed.
    Allowed {
        /// What authorized it.
        grant: Grant,
    },
    /// Do not proceed.
    Denied {
        /// Why.
        cause: DenialCause,
    },
}

impl Decision {
    /// Whether the check passed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Whether the check failed on the always-blocked set.
    #[must_use]
    pub fn is_always_blocked(&self) -> bool {
        matches!(
            self,
            Self::Denied {
                cause: DenialCause::AlwaysBlocked
            }
        )
    }

    /// Whether a human could still approve the resource.
    #[must_use]
    pub fn is_escalatable(&self) -> bool {
        matches!(
            self,
            Self::Denied {
                cause: DenialCause::NotInProfile
            }
        )
    }
}

/// Evaluates profiles, the always-blocked set, and approval tokens.
pub struct PermissionEnforcer {
    profiles: Arc<dyn ProfileStore>,
    tokens: Arc<TokenStore>,
    audit: AuditLog,
    always_blocked: BTreeSet<String>,
    default_profile: PermissionProfile,
}

impl PermissionEnforcer {
    /// Create an enforcer with the built-in always-blocked set and the
    /// `basic` default profile.
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>, tokens: Arc<TokenStore>, audit: AuditLog) -> Self {
        Self {
            profiles,
            tokens,
            audit,
            always_blocked: ALWAYS_BLOCKED_TOOLS.iter().map(ToString::to_string).collect(),
            default_profile: PermissionProfile::basic(),
        }
    }

    /// Replace the always-blocked set.
    #[must_use]
    pub fn with_always_blocked<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.always_blocked = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Profile used for tenants with nothing stored.
    #[must_use]
    pub fn with_default_profile(mut self, profile: PermissionProfile) -> Self {
        self.default_profile = profile;
        self
    }

    /// The always-blocked set.
    #[must_use]
    pub fn always_blocked(&self) -> &BTreeSet<String> {
        &self.always_blocked
    }

    /// Whether `tool` is always blocked.
    #[must_use]
    pub fn is_always_blocked(&self, tool: &str) -> bool {
        self.always_blocked.contains(tool)
    }

    /// Profile used for tenants with nothing stored.
    #[must_use]
    pub fn default_profile(&self) -> &PermissionProfile {
        &self.default_profile
    }

    /// The tenant's stored profile, or the default.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails.
    pub fn profile_for(&self, tenant_id: &TenantId) -> ApprovalResult<PermissionProfile> {
        if let Some(profile) = self.profiles.get(tenant_id)? {
            return Ok(profile);
        }
        debug!(
            tenant_id = %tenant_id,
            profile = self.default_profile.profile.as_deref().unwrap_or("default"),
            "no stored profile, using default"
        );
        Ok(self.default_profile.clone())
    }

    /// Check a tool.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_tool(&self, tenant_id: &TenantId, tool_name: &str) -> ApprovalResult<Decision> {
        self.check_tool_with(tenant_id, tool_name, None)
    }

    /// Check a tool, tagging an escalatable denial with the approval request
    /// the caller is about to raise.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_tool_with(
        &self,
        tenant_id: &TenantId,
        tool_name: &str,
        request_id: Option<RequestId>,
    ) -> ApprovalResult<Decision> {
        if self.is_always_blocked(tool_name) {
            info!(tenant_id = %tenant_id, tool_name, "tool is always blocked");
            self.audit_denial(tenant_id, tool_name, None, None)?;
            return Ok(Decision::Denied {
                cause: DenialCause::AlwaysBlocked,
            });
        }

        if self.profile_for(tenant_id)?.has_tool(tool_name) {
            return Ok(Decision::Allowed {
                grant: Grant::Profile,
            });
        }

        self.token_or_deny(tenant_id, tool_name, tool_name, None, request_id)
    }

    /// Check a data path against the profile's allow-prefixes.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_data_path(&self, tenant_id: &TenantId, path: &str) -> ApprovalResult<Decision> {
        self.check_data_path_with(tenant_id, path, None)
    }

    /// [`check_data_path`](Self::check_data_path) with a request id for the
    /// denial record.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_data_path_with(
        &self,
        tenant_id: &TenantId,
        path: &str,
        request_id: Option<RequestId>,
    ) -> ApprovalResult<Decision> {
        let profile = self.profile_for(tenant_id)?;
        if path_allowed(&profile.data_permissions.file_paths, path) {
            return Ok(Decision::Allowed {
                grant: Grant::Profile,
            });
        }
        self.token_or_deny(tenant_id, path, DATA_ACCESS_TOOL, Some(path), request_id)
    }

    /// Check an API endpoint.
    ///
    /// Profile entries match exactly, or as a prefix when they end in `*`.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_api_endpoint(
        &self,
        tenant_id: &TenantId,
        endpoint: &str,
    ) -> ApprovalResult<Decision> {
        self.check_api_endpoint_with(tenant_id, endpoint, None)
    }

    /// [`check_api_endpoint`](Self::check_api_endpoint) with a request id for
    /// the denial record.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the profile store fails or a
    /// denial cannot be audited.
    pub fn check_api_endpoint_with(
        &self,
        tenant_id: &TenantId,
        endpoint: &str,
        request_id: Option<RequestId>,
    ) -> ApprovalResult<Decision> {
        let profile = self.profile_for(tenant_id)?;
        if endpoint_allowed(&profile.data_permissions.api_endpoints, endpoint) {
            return Ok(Decision::Allowed {
                grant: Grant::Profile,
            });
        }
        self.token_or_deny(tenant_id, endpoint, API_ACCESS_TOOL, Some(endpoint), request_id)
    }

    fn token_or_deny(
        &self,
        tenant_id: &TenantId,
        resource: &str,
        tool_name: &str,
        audited_resource: Option<&str>,
        request_id: Option<RequestId>,
    ) -> ApprovalResult<Decision> {
        if self.tokens.validate(tenant_id, resource) {
            return Ok(Decision::Allowed {
                grant: Grant::Token,
            });
        }

        info!(tenant_id = %tenant_id, resource, "permission denied");
        self.audit_denial(tenant_id, tool_name, audited_resource, request_id)?;
        Ok(Decision::Denied {
            cause: DenialCause::NotInProfile,
        })
    }

    fn audit_denial(
        &self,
        tenant_id: &TenantId,
        tool_name: &str,
        resource: Option<&str>,
        request_id: Option<RequestId>,
    ) -> ApprovalResult<()> {
        self.audit.emit(AuditEvent::PermissionDenied {
            tenant_id: tenant_id.clone(),
            tool_name: tool_name.to_string(),
            decision: DECISION_DENY.to_string(),
            resource: resource.map(ToString::to_string),
            request_id: request_id.map(|id| id.to_string()),
        })?;
        Ok(())
    }
}

impl fmt::Debug for PermissionEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionEnforcer")
            .field("always_blocked", &self.always_blocked)
            .field("default_profile", &self.default_profile.profile)
            .finish_non_exhaustive()
    }
}

/// Whether `path` starts with any normalized allow-prefix.
#[must_use]
pub fn path_allowed(prefixes: &[String], path: &str) -> bool {
    prefixes
        .iter()
        .any(|entry| path.starts_with(&normalize_prefix(entry)))
}

/// Whether `endpoint` matches any allow entry.
#[must_use]
pub fn endpoint_allowed(entries: &[String], endpoint: &str) -> bool {
    entries.iter().any(|entry| {
        if entry.ends_with('*') {
            endpoint.starts_with(&normalize_prefix(entry))
        } else {
            endpoint == entry
        }
    })
}
