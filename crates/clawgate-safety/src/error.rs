//! Safety error types.

use clawgate_core::SecurityError;
use thiserror::Error;

/// Input rejected or content blocked by the safety filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyViolation {
    /// Tool name longer than the configured cap.
    #[error("tool name too long: {len} > {max}")]
    ToolNameTooLong {
        /// Actual length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Tool name contains characters outside `[A-Za-z0-9_]`, or is empty.
    #[error("tool name contains invalid characters: {name:?}")]
    InvalidToolName {
        /// The offending name.
        name: String,
    },

    /// Resource path longer than the configured cap.
    #[error("resource path too long: {len} > {max}")]
    PathTooLong {
        /// Actual length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Resource path contains a NUL byte.
    #[error("null byte in resource path")]
    NullByte,

    /// Resource path contains a `..` segment.
    #[error("path traversal attempt in resource")]
    PathTraversal,

    /// Memory summary matched an injection signature.
    #[error("injection pattern detected: {snippet:?}")]
    MemoryInjection {
        /// Up to the first 40 characters of the matched text.
        snippet: String,
    },
}

impl SafetyViolation {
    /// Name of the input field the violation applies to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::ToolNameTooLong { .. } | Self::InvalidToolName { .. } => "tool_name",
            Self::PathTooLong { .. } | Self::NullByte | Self::PathTraversal => "resource",
            Self::MemoryInjection { .. } => "session_summary",
        }
    }
}

impl From<SafetyViolation> for SecurityError {
    fn from(v: SafetyViolation) -> Self {
        SecurityError::SafetyViolation {
            field: v.field().to_string(),
            reason: v.to_string(),
        }
    }
}

/// Errors raised while building a filter.
#[derive(Debug, Error)]
pub enum SafetyError {
    /// An operator-supplied memory pattern failed to compile.
    #[error("invalid memory pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },
}

/// Result type for filter construction.
pub type SafetyResult<T> = Result<T, SafetyError>;
