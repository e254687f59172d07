//! CLI handlers for the `clawgate config` subcommand.

use anyhow::Result;
use clawgate_config::{ResolvedConfig, ShowFormat, env};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> Result<()> {
    let show_format: ShowFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Show all config file paths that are checked.
pub(crate) fn show_paths(resolved: &ResolvedConfig) {
    let home = directories::BaseDirs::new().map(|d| d.home_dir().to_string_lossy().to_string());
    let paths = ResolvedConfig::config_paths(home.as_deref());

    println!("{}\n", Theme::header("Configuration files (in precedence order)"));
    for (i, path) in paths.iter().enumerate() {
        let exists = std::path::Path::new(path).exists();
        let status = if exists { "found" } else { "not found" };
        println!("  {}. {path}  [{status}]", i.saturating_add(1));
    }

    if !resolved.loaded_files.is_empty() {
        println!("\n{}", Theme::header("Loaded"));
        for path in &resolved.loaded_files {
            println!("  - {path}");
        }
    }

    println!("\n{}", Theme::header("Environment overrides"));
    for var in env::supported_vars() {
        println!("  {var}");
    }
}
