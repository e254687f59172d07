//! Clawgate Telemetry - Logging and invocation timing.
//!
//! This crate provides:
//! - Logging setup with multiple formats and rolling file output
//! - An invocation context for timing one agent round trip
//!
//! # Example
//!
//! ```rust,no_run
//! use clawgate_telemetry::{InvocationContext, LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), clawgate_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("clawgate_approval=debug");
//! setup_logging(&config)?;
//!
//! let ctx = InvocationContext::new("acme").with_operation("chat");
//! let span = ctx.span();
//! let _guard = span.enter();
//! tracing::info!(elapsed_ms = ctx.elapsed_ms(), "invocation finished");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::InvocationContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
