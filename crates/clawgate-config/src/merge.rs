//! Layered merging with per-field source tracking.

use std::collections::HashMap;
use std::fmt;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// System-wide configuration (`/etc/clawgate/config.toml`).
    System,
    /// User-level configuration (`~/.clawgate/config.toml`).
    User,
    /// A file passed explicitly (`--config`).
    File(String),
    /// A `CLAWGATE_*` environment variable.
    Environment(String),
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::System => write!(f, "system (/etc/clawgate/config.toml)"),
            Self::User => write!(f, "user (~/.clawgate/config.toml)"),
            Self::File(path) => write!(f, "file ({path})"),
            Self::Environment(var) => write!(f, "env ({var})"),
        }
    }
}

/// Dotted field path to the layer that last set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer.clone());
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Record every leaf under `val` as set by `layer`.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_scalars_and_arrays_replace() {
        let mut base = parse(
            r#"
            [policy]
            always_blocked = ["eval", "load_extension"]
            default_profile = "basic"
            "#,
        );
        let overlay = parse(
            r#"
            [policy]
            always_blocked = ["eval"]
            "#,
        );
        let mut sources = FieldSources::new();
        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(base["policy"]["always_blocked"], parse("v = [\"eval\"]")["v"]);
        assert_eq!(base["policy"]["default_profile"].as_str(), Some("basic"));
        assert_eq!(sources.get("policy.always_blocked"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("policy.default_profile"));
    }

    #[test]
    fn test_new_tables_are_added_and_tracked() {
        let mut base = parse("[profiles.basic]\ntools = [\"web_search\"]");
        let overlay = parse("[profiles.analyst]\ntools = [\"browser\"]\nfile_paths = [\"/data/*\"]");
        let mut sources = FieldSources::new();
        let layer = ConfigLayer::File("team.toml".to_owned());
        deep_merge_tracking(&mut base, &overlay, "", &layer, &mut sources);

        assert!(base["profiles"].get("basic").is_some());
        assert_eq!(base["profiles"]["analyst"]["tools"][0].as_str(), Some("browser"));
        assert_eq!(sources.get("profiles.analyst.file_paths"), Some(&layer));
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(ConfigLayer::Defaults.to_string(), "defaults");
        assert_eq!(
            ConfigLayer::Environment("CLAWGATE_STACK".to_owned()).to_string(),
            "env (CLAWGATE_STACK)"
        );
    }
}
