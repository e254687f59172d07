//! `CLAWGATE_*` environment overrides.
//!
//! Environment variables sit above every file layer: a set variable always
//! wins.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};

/// How an environment value is coerced into TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Str,
    Int,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

/// All supported `CLAWGATE_*` mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "CLAWGATE_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CLAWGATE_LOG_FORMAT",
        field_path: "logging.format",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CLAWGATE_STACK",
        field_path: "storage.stack",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CLAWGATE_PROFILE_ROOT",
        field_path: "storage.profile_root",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CLAWGATE_APPROVAL_TIMEOUT_SECS",
        field_path: "approval.timeout_secs",
        kind: ValueKind::Int,
    },
    EnvMapping {
        var_name: "CLAWGATE_MAX_TOKEN_TTL_HOURS",
        field_path: "tokens.max_ttl_hours",
        kind: ValueKind::Int,
    },
];

/// Collect the process's `CLAWGATE_*` variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("CLAWGATE_"))
        .collect()
}

/// Names of every supported variable.
#[must_use]
pub fn supported_vars() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Apply every set variable on top of `merged`.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a numeric variable does not parse.
pub fn apply_env_overrides<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let value = match mapping.kind {
            ValueKind::Str => toml::Value::String(raw.to_owned()),
            ValueKind::Int => {
                let n: i64 = raw.parse().map_err(|_| ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("expected a non-negative integer, got '{raw}'"),
                })?;
                if n < 0 {
                    return Err(ConfigError::EnvError {
                        var_name: mapping.var_name.to_owned(),
                        message: format!("expected a non-negative integer, got '{raw}'"),
                    });
                }
                toml::Value::Integer(n)
            },
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var override"
        );
        set_path(merged, mapping.field_path, value);
        sources.insert(
            mapping.field_path.to_owned(),
            ConfigLayer::Environment(mapping.var_name.to_owned()),
        );
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Set a dotted path in the tree, creating intermediate tables.
fn set_path(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments = path.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), value);
            return;
        }
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn base() -> toml::Value {
        toml::from_str("[approval]\ntimeout_secs = 1800\n[storage]\nstack = \"dev\"").unwrap()
    }

    #[test]
    fn test_overrides_win_and_are_tracked() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        sources.insert("storage.stack".to_owned(), ConfigLayer::User);

        let count = apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[
                ("CLAWGATE_STACK", "prod"),
                ("CLAWGATE_APPROVAL_TIMEOUT_SECS", "600"),
            ]),
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(merged["storage"]["stack"].as_str(), Some("prod"));
        assert_eq!(merged["approval"]["timeout_secs"].as_integer(), Some(600));
        assert_eq!(
            sources.get("storage.stack"),
            Some(&ConfigLayer::Environment("CLAWGATE_STACK".to_owned()))
        );
    }

    #[test]
    fn test_missing_tables_are_created() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();
        apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[("CLAWGATE_PROFILE_ROOT", "/var/lib/clawgate")]),
        )
        .unwrap();
        assert_eq!(
            merged["storage"]["profile_root"].as_str(),
            Some("/var/lib/clawgate")
        );
    }

    #[test]
    fn test_bad_integer_is_env_error() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        for bad in ["soon", "-5"] {
            let err = apply_env_overrides(
                &mut merged,
                &mut sources,
                &env(&[("CLAWGATE_MAX_TOKEN_TTL_HOURS", bad)]),
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::EnvError { ref var_name, .. }
                if var_name == "CLAWGATE_MAX_TOKEN_TTL_HOURS"));
        }
    }

    #[test]
    fn test_blank_and_unknown_vars_ignored() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        let count = apply_env_overrides(
            &mut merged,
            &mut sources,
            &env(&[("CLAWGATE_STACK", "  "), ("CLAWGATE_UNKNOWN", "x")]),
        )
        .unwrap();
        assert_eq!(count, 0);
        assert_eq!(merged["storage"]["stack"].as_str(), Some("dev"));
    }

    #[test]
    fn test_supported_vars_listed() {
        assert!(supported_vars().contains(&"CLAWGATE_LOG_LEVEL"));
    }
}
