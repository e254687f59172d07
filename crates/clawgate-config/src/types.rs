//! Configuration types for clawgate.
//!
//! All types in this module are self-contained with no dependencies on other
//! internal clawgate crates. Domain types are mirrored here and converted at
//! the boundary. Every struct implements [`Default`] matching
//! `defaults.toml`, so a bare `[section]` header in TOML produces a working
//! configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging level, format, and per-target directives.
    pub logging: LoggingConfig,
    /// Approval window and temporary-grant defaults.
    pub approval: ApprovalConfig,
    /// Approval token limits.
    pub tokens: TokensConfig,
    /// Safety filter limits and extra memory signatures.
    pub safety: SafetyConfig,
    /// Always-blocked tools and the default profile name.
    pub policy: PolicyConfig,
    /// Built-in permission profiles by name.
    pub profiles: BTreeMap<String, ProfileConfig>,
    /// Risk classification lists.
    pub risk: RiskConfig,
    /// Where tenant profiles are kept.
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "basic".to_owned(),
            ProfileConfig {
                tools: strings(&["web_search"]),
                ..ProfileConfig::default()
            },
        );
        profiles.insert(
            "advanced".to_owned(),
            ProfileConfig {
                tools: strings(&[
                    "web_search",
                    "shell",
                    "browser",
                    "file",
                    "file_write",
                    "code_execution",
                ]),
                ..ProfileConfig::default()
            },
        );
        Self {
            logging: LoggingConfig::default(),
            approval: ApprovalConfig::default(),
            tokens: TokensConfig::default(),
            safety: SafetyConfig::default(),
            policy: PolicyConfig::default(),
            profiles,
            risk: RiskConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `pretty`, `compact`, `json`, or `full`.
    pub format: String,
    /// Extra `EnvFilter` directives, e.g. `clawgate_approval=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Approval & tokens
// ---------------------------------------------------------------------------

/// Approval workflow settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Seconds a request may wait before it is auto-rejected.
    pub timeout_secs: u64,
    /// TTL for temporary approvals without a usable suggestion.
    pub default_ttl_hours: u32,
    /// Resolved request statuses kept for status queries.
    pub resolved_history: usize,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 1800,
            default_ttl_hours: 1,
            resolved_history: 1024,
        }
    }
}

/// Approval token settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    /// Hard cap on token lifetime. At most 24.
    pub max_ttl_hours: u32,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self { max_ttl_hours: 24 }
    }
}

// ---------------------------------------------------------------------------
// Safety
// ---------------------------------------------------------------------------

/// Safety filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Inbound messages are truncated to this many characters.
    pub max_message_chars: usize,
    /// Longest accepted tool name.
    pub max_tool_name_len: usize,
    /// Longest accepted resource path.
    pub max_resource_path_len: usize,
    /// Memory-injection regexes added to the built-in catalogue.
    pub extra_memory_patterns: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 32_000,
            max_tool_name_len: 64,
            max_resource_path_len: 512,
            extra_memory_patterns: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy & profiles
// ---------------------------------------------------------------------------

/// Enforcement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Tools no profile or token can unlock.
    pub always_blocked: Vec<String>,
    /// Profile used for tenants with nothing stored. Must name an entry in
    /// `[profiles]`.
    pub default_profile: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            always_blocked: strings(&["install_skill", "load_extension", "eval"]),
            default_profile: "basic".to_owned(),
        }
    }
}

/// A named permission profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Allowed tools.
    pub tools: Vec<String>,
    /// Allowed path prefixes (`/data/*` style).
    pub file_paths: Vec<String>,
    /// Allowed API endpoints.
    pub api_endpoints: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Risk classification lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Tools that are always high risk.
    pub high_risk_tools: Vec<String>,
    /// Tools that are always medium risk.
    pub medium_risk_tools: Vec<String>,
    /// Tools that are always low risk.
    pub low_risk_tools: Vec<String>,
    /// Path substrings that force high risk.
    pub high_risk_keywords: Vec<String>,
    /// Path substrings that force low risk.
    pub low_risk_keywords: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_risk_tools: strings(&["shell"]),
            medium_risk_tools: strings(&["file_write", "code_execution"]),
            low_risk_tools: strings(&["web_search"]),
            high_risk_keywords: strings(&["system", "/etc/", "/var/", "/usr/", "/bin/", "/sbin/"]),
            low_risk_keywords: strings(&["read", "public", "readonly"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Tenant profile storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Deployment stack name, used as a namespace (`dev`, `prod`, ...).
    pub stack: String,
    /// Root directory for JSON profile files. Unset keeps profiles in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_root: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            stack: "dev".to_owned(),
            profile_root: None,
        }
    }
}
