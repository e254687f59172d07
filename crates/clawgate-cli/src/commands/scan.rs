//! CLI handlers for `clawgate scan`.

use std::path::Path;

use anyhow::{Context, Result};
use clawgate_gateway::Gatekeeper;

use crate::theme::Theme;

/// Check a memory summary file, exiting non-zero on a violation.
pub(crate) fn scan_memory(gate: &Gatekeeper, file: &Path) -> Result<()> {
    let summary = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    match gate.filter().check_memory_safety(&summary) {
        Ok(()) => {
            println!("{}", Theme::success("no injection signatures found"));
            Ok(())
        },
        Err(violation) => {
            eprintln!("{}", Theme::error(&violation.to_string()));
            std::process::exit(1);
        },
    }
}

/// Show what the inbound limits leave of a message.
pub(crate) fn scan_message(gate: &Gatekeeper, text: &str) {
    let screened = gate.screen_inbound(text);
    let original = text.chars().count();
    let kept = screened.chars().count();

    if kept < original {
        println!(
            "{}",
            Theme::warning(&format!("truncated from {original} to {kept} characters"))
        );
    } else {
        println!("{}", Theme::success(&format!("{kept} characters, within limits")));
    }
    println!("{screened}");
}
