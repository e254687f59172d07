//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use regex::Regex;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Hard ceiling on token lifetime, in hours.
pub const MAX_TOKEN_TTL_HOURS: u32 = 24;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_tokens(config)?;
    validate_approval(config)?;
    validate_safety(config)?;
    validate_policy(config)?;
    validate_profiles(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

fn validate_tokens(config: &Config) -> ConfigResult<()> {
    let max = config.tokens.max_ttl_hours;
    if max == 0 || max > MAX_TOKEN_TTL_HOURS {
        return Err(ConfigError::invalid(
            "tokens.max_ttl_hours",
            format!("max_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {max}"),
        ));
    }
    Ok(())
}

fn validate_approval(config: &Config) -> ConfigResult<()> {
    let a = &config.approval;

    if a.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "approval.timeout_secs",
            "timeout_secs must be greater than 0",
        ));
    }

    if a.default_ttl_hours == 0 || a.default_ttl_hours > config.tokens.max_ttl_hours {
        return Err(ConfigError::invalid(
            "approval.default_ttl_hours",
            format!(
                "default_ttl_hours ({}) must be between 1 and tokens.max_ttl_hours ({})",
                a.default_ttl_hours, config.tokens.max_ttl_hours
            ),
        ));
    }

    if a.resolved_history == 0 {
        return Err(ConfigError::invalid(
            "approval.resolved_history",
            "resolved_history must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_safety(config: &Config) -> ConfigResult<()> {
    let s = &config.safety;

    for (field, value) in [
        ("safety.max_message_chars", s.max_message_chars),
        ("safety.max_tool_name_len", s.max_tool_name_len),
        ("safety.max_resource_path_len", s.max_resource_path_len),
    ] {
        if value == 0 {
            return Err(ConfigError::invalid(field, "must be greater than 0"));
        }
    }

    for pattern in &s.extra_memory_patterns {
        if let Err(e) = Regex::new(pattern) {
            return Err(ConfigError::invalid(
                "safety.extra_memory_patterns",
                format!("invalid pattern '{pattern}': {e}"),
            ));
        }
    }

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_policy(config: &Config) -> ConfigResult<()> {
    let p = &config.policy;

    if let Some(bad) = p.always_blocked.iter().find(|t| !is_identifier(t)) {
        return Err(ConfigError::invalid(
            "policy.always_blocked",
            format!("'{bad}' is not a valid tool name"),
        ));
    }

    if !config.profiles.contains_key(&p.default_profile) {
        return Err(ConfigError::invalid(
            "policy.default_profile",
            format!(
                "profile '{}' is not defined under [profiles]",
                p.default_profile
            ),
        ));
    }

    Ok(())
}

fn validate_profiles(config: &Config) -> ConfigResult<()> {
    for (name, profile) in &config.profiles {
        if !is_identifier(name) {
            return Err(ConfigError::invalid(
                format!("profiles.{name}"),
                "profile names may only contain letters, digits, and '_'",
            ));
        }
        if profile.file_paths.iter().any(|p| p.trim().is_empty())
            || profile.api_endpoints.iter().any(|p| p.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                format!("profiles.{name}"),
                "empty path or endpoint entries are not allowed",
            ));
        }
    }
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    let stack = &config.storage.stack;
    let usable = !stack.is_empty()
        && stack
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if !usable {
        return Err(ConfigError::invalid(
            "storage.stack",
            format!("'{stack}' is not a valid stack name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_token_ttl_cap() {
        let mut config = Config::default();
        config.tokens.max_ttl_hours = 25;
        assert_eq!(field_of(validate(&config).unwrap_err()), "tokens.max_ttl_hours");

        config.tokens.max_ttl_hours = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_default_ttl_must_fit_under_max() {
        let mut config = Config::default();
        config.tokens.max_ttl_hours = 4;
        config.approval.default_ttl_hours = 6;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "approval.default_ttl_hours"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.approval.timeout_secs = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "approval.timeout_secs");
    }

    #[test]
    fn test_unknown_default_profile() {
        let mut config = Config::default();
        config.policy.default_profile = "superuser".to_owned();
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "policy.default_profile"
        );
    }

    #[test]
    fn test_bad_memory_pattern() {
        let mut config = Config::default();
        config.safety.extra_memory_patterns = vec!["(unclosed".to_owned()];
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "safety.extra_memory_patterns"
        );
    }

    #[test]
    fn test_blocked_tool_names_checked() {
        let mut config = Config::default();
        config.policy.always_blocked.push("rm -rf".to_owned());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_logging_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.format");
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::default();
        config.safety.max_tool_name_len = 0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "safety.max_tool_name_len"
        );
    }

    #[test]
    fn test_stack_name() {
        let mut config = Config::default();
        config.storage.stack = "../prod".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "storage.stack");
    }
}
