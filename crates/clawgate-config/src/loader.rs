//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/clawgate/config.toml` (system)
//! 3. Merge `~/.clawgate/config.toml` (user)
//! 4. Merge the explicit `--config` file, if any
//! 5. Apply `CLAWGATE_*` environment overrides
//! 6. Deserialize merged tree → `Config`
//! 7. Validate
//! 8. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
pub const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/clawgate/config.toml";

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Files consulted by [`load_layers`], lowest priority first.
#[derive(Debug, Clone, Default)]
pub struct LoadPaths {
    /// System layer; skipped when `None`.
    pub system: Option<PathBuf>,
    /// User layer; skipped when `None`.
    pub user: Option<PathBuf>,
    /// Explicit file. Unlike the other layers it must exist.
    pub explicit: Option<PathBuf>,
}

impl LoadPaths {
    /// Standard discovery relative to `home_dir`.
    #[must_use]
    pub fn standard(home_dir: &Path, explicit: Option<&Path>) -> Self {
        Self {
            system: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
            user: Some(home_dir.join(".clawgate").join("config.toml")),
            explicit: explicit.map(Path::to_path_buf),
        }
    }
}

/// Load the configuration with full layered precedence.
///
/// `home_override` replaces the detected home directory for user-level
/// config discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, the explicit
/// file is missing, or the final merged configuration fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let home_dir = match home_override {
        Some(h) => h.to_path_buf(),
        None => home_directory()?,
    };
    load_layers(&LoadPaths::standard(&home_dir, explicit), &collect_env_vars())
}

/// Load from an explicit set of layer files and environment variables.
///
/// # Errors
///
/// See [`load`].
pub fn load_layers<S: ::std::hash::BuildHasher>(
    paths: &LoadPaths,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2-3. Optional system and user files.
    let optional = [
        (paths.system.as_deref(), ConfigLayer::System),
        (paths.user.as_deref(), ConfigLayer::User),
    ];
    for (path, layer) in optional {
        let Some(path) = path else { continue };
        if let Some(overlay) = try_load_file(path)? {
            deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), layer = %layer, "loaded config");
        }
    }

    // 4. Explicit file.
    if let Some(path) = paths.explicit.as_deref() {
        let overlay = read_toml(path)?;
        let layer = ConfigLayer::File(path.display().to_string());
        deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded explicit config");
    }

    // 5. Environment overrides.
    let env_count = apply_env_overrides(&mut merged, &mut field_sources, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    // 6. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 7. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// Sections missing from the file take their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = read_bounded(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match read_toml(path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    let content = read_bounded(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Read a file in one go, then check its size.
fn read_bounded(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::invalid(
            path.display().to_string(),
            format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        ));
    }
    Ok(content)
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_defaults_only() {
        let resolved = load_layers(&LoadPaths::default(), &no_env()).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("approval.timeout_secs"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let system = dir.path().join("system.toml");
        let user = dir.path().join("user.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(&system, "[storage]\nstack = \"staging\"\n[approval]\ntimeout_secs = 900").unwrap();
        fs::write(&user, "[storage]\nstack = \"prod\"").unwrap();
        fs::write(&explicit, "[approval]\ntimeout_secs = 600").unwrap();

        let paths = LoadPaths {
            system: Some(system),
            user: Some(user),
            explicit: Some(explicit.clone()),
        };
        let mut env = no_env();
        env.insert("CLAWGATE_MAX_TOKEN_TTL_HOURS".to_owned(), "12".to_owned());

        let resolved = load_layers(&paths, &env).unwrap();
        assert_eq!(resolved.config.storage.stack, "prod");
        assert_eq!(resolved.config.approval.timeout_secs, 600);
        assert_eq!(resolved.config.tokens.max_ttl_hours, 12);
        assert_eq!(resolved.loaded_files.len(), 3);
        assert_eq!(
            resolved.field_sources.get("storage.stack"),
            Some(&ConfigLayer::User)
        );
        assert_eq!(
            resolved.field_sources.get("approval.timeout_secs"),
            Some(&ConfigLayer::File(explicit.display().to_string()))
        );
    }

    #[test]
    fn test_env_beats_files() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.toml");
        fs::write(&user, "[approval]\ntimeout_secs = 900").unwrap();
        let mut env = no_env();
        env.insert("CLAWGATE_APPROVAL_TIMEOUT_SECS".to_owned(), "60".to_owned());

        let paths = LoadPaths {
            user: Some(user),
            ..LoadPaths::default()
        };
        let resolved = load_layers(&paths, &env).unwrap();
        assert_eq!(resolved.config.approval.timeout_secs, 60);
    }

    #[test]
    fn test_missing_optional_files_skipped() {
        let paths = LoadPaths {
            system: Some(PathBuf::from("/nonexistent/system.toml")),
            user: Some(PathBuf::from("/nonexistent/user.toml")),
            explicit: None,
        };
        assert!(load_layers(&paths, &no_env()).is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let paths = LoadPaths {
            explicit: Some(PathBuf::from("/nonexistent/clawgate.toml")),
            ..LoadPaths::default()
        };
        let err = load_layers(&paths, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.toml");
        fs::write(&explicit, "[tokens]\nmax_ttl_hours = 48").unwrap();
        let paths = LoadPaths {
            explicit: Some(explicit),
            ..LoadPaths::default()
        };
        let err = load_layers(&paths, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_oversized_file_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.toml");
        let padding = "#".repeat(1_100_000);
        fs::write(&path, padding).unwrap();
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[approval\ntimeout_secs = ").unwrap();
        assert!(matches!(
            try_load_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[storage]\nstack = \"qa\"").unwrap();
        let config = load_file(&path).unwrap();
        assert_eq!(config.storage.stack, "qa");
        assert_eq!(config.tokens.max_ttl_hours, 24);
        assert!(config.profiles.contains_key("basic"));
    }

    #[test]
    fn test_standard_paths() {
        let paths = LoadPaths::standard(Path::new("/home/op"), None);
        assert_eq!(paths.system, Some(PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(
            paths.user,
            Some(PathBuf::from("/home/op/.clawgate/config.toml"))
        );
        assert!(paths.explicit.is_none());
    }
}
