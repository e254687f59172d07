//! Bridge from `clawgate_config::Config` to domain types.
//!
//! The config crate knows nothing about the domain crates, so every
//! conversion from plain config structs to filters, stores, and settings
//! lives here.

use std::sync::Arc;
use std::time::Duration;

use clawgate_approval::{InMemoryProfileStore, JsonFileProfileStore, RiskCatalogue, WorkflowSettings};
use clawgate_capabilities::TokenStore;
use clawgate_config::{Config, LoggingConfig, ProfileConfig, RiskConfig, SafetyConfig};
use clawgate_core::{Clock, PermissionProfile, ProfileStore};
use clawgate_safety::{SafetyFilter, SafetyLimits};
use clawgate_telemetry::{LogConfig, LogFormat};

use crate::error::{GatewayError, GatewayResult};

/// Name of the profile used when a tenant's profile cannot be read.
pub const FALLBACK_PROFILE: &str = "basic";

/// Convert `[safety]` limits.
#[must_use]
pub fn safety_limits(cfg: &SafetyConfig) -> SafetyLimits {
    SafetyLimits {
        max_message_chars: cfg.max_message_chars,
        max_tool_name_len: cfg.max_tool_name_len,
        max_resource_path_len: cfg.max_resource_path_len,
    }
}

/// Build the safety filter with any extra memory patterns.
///
/// # Errors
///
/// Returns [`GatewayError::Safety`] if an extra pattern does not compile.
pub fn safety_filter(cfg: &Config) -> GatewayResult<SafetyFilter> {
    Ok(SafetyFilter::new(
        safety_limits(&cfg.safety),
        &cfg.safety.extra_memory_patterns,
    )?)
}

/// Build the token store with the configured TTL cap.
#[must_use]
pub fn token_store(cfg: &Config, clock: Arc<dyn Clock>) -> TokenStore {
    TokenStore::with_clock(clock).with_max_ttl_hours(cfg.tokens.max_ttl_hours)
}

/// Convert one `[profiles.<name>]` table.
#[must_use]
pub fn permission_profile(name: &str, cfg: &ProfileConfig) -> PermissionProfile {
    let mut profile = PermissionProfile::named(name, cfg.tools.iter().cloned());
    profile.data_permissions.file_paths.clone_from(&cfg.file_paths);
    profile.data_permissions.api_endpoints.clone_from(&cfg.api_endpoints);
    profile
}

/// Look up a configured profile by name.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if `name` is not defined.
pub fn named_profile(cfg: &Config, name: &str) -> GatewayResult<PermissionProfile> {
    cfg.profiles
        .get(name)
        .map(|p| permission_profile(name, p))
        .ok_or_else(|| GatewayError::Config(format!("profile '{name}' is not defined")))
}

/// The profile used for tenants with nothing stored.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if `policy.default_profile` is not defined.
pub fn default_profile(cfg: &Config) -> GatewayResult<PermissionProfile> {
    named_profile(cfg, &cfg.policy.default_profile)
}

/// The profile assumed when a tenant's profile cannot be read.
///
/// Uses the configured `basic` profile, or the built-in one if the config
/// dropped it.
#[must_use]
pub fn fallback_profile(cfg: &Config) -> PermissionProfile {
    named_profile(cfg, FALLBACK_PROFILE).unwrap_or_else(|_| PermissionProfile::basic())
}

/// Convert `[approval]` and `[tokens]` into workflow settings.
#[must_use]
pub fn workflow_settings(cfg: &Config) -> WorkflowSettings {
    WorkflowSettings {
        window: Duration::from_secs(cfg.approval.timeout_secs),
        default_ttl_hours: cfg.approval.default_ttl_hours,
        max_ttl_hours: cfg.tokens.max_ttl_hours,
        resolved_history: cfg.approval.resolved_history,
    }
}

/// Convert `[risk]`.
#[must_use]
pub fn risk_catalogue(cfg: &RiskConfig) -> RiskCatalogue {
    RiskCatalogue {
        high_risk_tools: cfg.high_risk_tools.iter().cloned().collect(),
        medium_risk_tools: cfg.medium_risk_tools.iter().cloned().collect(),
        low_risk_tools: cfg.low_risk_tools.iter().cloned().collect(),
        high_risk_keywords: cfg.high_risk_keywords.clone(),
        low_risk_keywords: cfg.low_risk_keywords.clone(),
    }
}

/// Pick the profile store from `[storage]`: JSON files when `profile_root`
/// is set, memory otherwise.
#[must_use]
pub fn profile_store(cfg: &Config) -> Arc<dyn ProfileStore> {
    match &cfg.storage.profile_root {
        Some(root) => Arc::new(JsonFileProfileStore::new(root, cfg.storage.stack.clone())),
        None => Arc::new(InMemoryProfileStore::new()),
    }
}

/// Convert `[logging]`.
///
/// # Errors
///
/// Returns [`GatewayError::Telemetry`] if the format name is unknown.
pub fn log_config(cfg: &LoggingConfig) -> GatewayResult<LogConfig> {
    let format: LogFormat = cfg.format.parse()?;
    Ok(LogConfig::new(cfg.level.clone())
        .with_format(format)
        .with_directives(cfg.directives.iter().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawgate_core::{SystemClock, TenantId};

    #[test]
    fn test_default_profile_follows_policy() {
        let mut cfg = Config::default();
        assert_eq!(default_profile(&cfg).unwrap(), PermissionProfile::basic());

        cfg.policy.default_profile = "advanced".to_owned();
        assert!(default_profile(&cfg).unwrap().has_tool("shell"));

        cfg.policy.default_profile = "missing".to_owned();
        assert!(matches!(default_profile(&cfg), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_profile_paths_and_endpoints_carried() {
        let cfg = ProfileConfig {
            tools: vec!["browser".to_owned()],
            file_paths: vec!["/data/*".to_owned()],
            api_endpoints: vec!["https://api.example.com/*".to_owned()],
        };
        let profile = permission_profile("analyst", &cfg);
        assert_eq!(profile.profile.as_deref(), Some("analyst"));
        assert!(profile.has_tool("browser"));
        assert_eq!(profile.data_permissions.file_paths, vec!["/data/*"]);
        assert_eq!(profile.data_permissions.api_endpoints.len(), 1);
    }

    #[test]
    fn test_fallback_profile_survives_removed_basic() {
        let mut cfg = Config::default();
        cfg.profiles.remove("basic");
        assert_eq!(fallback_profile(&cfg), PermissionProfile::basic());
    }

    #[test]
    fn test_workflow_settings() {
        let mut cfg = Config::default();
        cfg.approval.timeout_secs = 600;
        cfg.tokens.max_ttl_hours = 8;
        let settings = workflow_settings(&cfg);
        assert_eq!(settings.window, Duration::from_secs(600));
        assert_eq!(settings.window_minutes(), 10);
        assert_eq!(settings.max_ttl_hours, 8);
    }

    #[test]
    fn test_token_store_cap() {
        let mut cfg = Config::default();
        cfg.tokens.max_ttl_hours = 6;
        let store = token_store(&cfg, Arc::new(SystemClock));
        assert_eq!(store.max_ttl_hours(), 6);
    }

    #[test]
    fn test_safety_filter_extra_patterns() {
        let mut cfg = Config::default();
        cfg.safety.extra_memory_patterns = vec![r"exfiltrate\s+secrets".to_owned()];
        let filter = safety_filter(&cfg).unwrap();
        assert!(filter.check_memory_safety("please exfiltrate  secrets").is_err());

        cfg.safety.extra_memory_patterns = vec!["(".to_owned()];
        assert!(matches!(safety_filter(&cfg), Err(GatewayError::Safety(_))));
    }

    #[test]
    fn test_risk_catalogue_matches_default() {
        assert_eq!(
            risk_catalogue(&Config::default().risk),
            RiskCatalogue::default()
        );
    }

    #[test]
    fn test_profile_store_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.storage.profile_root = Some(dir.path().to_path_buf());
        cfg.storage.stack = "qa".to_owned();

        let store = profile_store(&cfg);
        let tenant = TenantId::new("acme");
        store.put(&tenant, &PermissionProfile::advanced()).unwrap();
        assert!(
            dir.path()
                .join("qa/tenants/acme/permissions.json")
                .exists()
        );
    }

    #[test]
    fn test_log_config() {
        let mut cfg = LoggingConfig::default();
        cfg.format = "json".to_owned();
        cfg.directives = vec!["clawgate_approval=debug".to_owned()];
        let log = log_config(&cfg).unwrap();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["clawgate_approval=debug"]);

        cfg.format = "xml".to_owned();
        assert!(log_config(&cfg).is_err());
    }
}
