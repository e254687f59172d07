//! Utility functions for the clawgate core library.

/// Truncate a string to at most `max_chars` characters (Unicode scalar
/// values, not bytes). Returns the original string if already short enough.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Normalise an allow-list prefix: strip trailing `*`, then trailing `/`,
/// then append exactly one `/`.
///
/// `/data/*` and `/data/` and `/data` all normalise to `/data/`, which
/// matches `/data/foo` but not `/database/foo`.
#[must_use]
pub fn normalize_prefix(entry: &str) -> String {
    let trimmed = entry.trim_end_matches('*').trim_end_matches('/');
    format!("{trimmed}/")
}
