//! Memory-poisoning signature catalogue.
//!
//! Phrases that indicate an attempt to plant persistent instructions in a
//! session summary. The list errs toward blocking: a false positive costs one
//! summary, a false negative lets an attacker steer every later session.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::error::{SafetyError, SafetyResult};

/// Built-in injection signatures, matched case-insensitively with `.`
/// spanning line breaks.
pub const MEMORY_INJECTION_PATTERNS: &[&str] = &[
    r"ignore\s+(all\s+)?(previous|prior|above)\s+instructions",
    r"you\s+are\s+now\s+",
    r"new\s+system\s+prompt",
    r"forget\s+(everything|all|your\s+instructions)",
    r"disregard\s+(your|all|previous)",
    r"override\s+(your|the)\s+(instructions|rules|guidelines)",
    r"act\s+as\s+(if\s+you\s+are|a\s+)",
    r"pretend\s+(you\s+are|to\s+be)",
    r"your\s+new\s+(role|persona|identity|instructions)",
    r"from\s+now\s+on\s+you\s+(will|must|should)",
    // XML-style system tag
    r"<\s*system\s*>",
    // Llama instruction marker
    r"\[INST\]",
    // Markdown instruction header
    r"###\s*instruction",
];

/// Compiled built-in catalogue.
pub(crate) static BUILTIN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    MEMORY_INJECTION_PATTERNS
        .iter()
        .map(|p| compile(p).expect("invalid built-in memory pattern"))
        .collect()
});

/// Compile one signature with the catalogue's matching flags.
///
/// # Errors
///
/// Returns [`SafetyError::InvalidPattern`] if `pattern` is not a valid regex.
pub fn compile(pattern: &str) -> SafetyResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| SafetyError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
