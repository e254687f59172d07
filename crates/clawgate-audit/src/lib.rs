//! Clawgate Audit - Structured audit events.
//!
//! Every permission denial, approval decision, and agent invocation is
//! recorded as a flat JSON document:
//!
//! ```text
//! {"timestamp": "...", "log_stream": "tenant_acme", "event_type": "permission_denied", ...}
//! ```
//!
//! `log_stream` is `tenant_{id}` for tenant-originated events and
//! [`AUTH_AGENT_STREAM`] for decisions made by the approval side.
//!
//! Records go to an [`AuditSink`]. The [`TracingAuditSink`] writes each one
//! as a `STRUCTURED_LOG {json}` line through `tracing`, which lets any log
//! shipper pick them out by prefix.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod event;
mod sink;

pub use error::{AuditError, AuditResult};
pub use event::{
    AUTH_AGENT_STREAM, AuditEvent, AuditRecord, DECISION_DENY, DECISION_RESPONSE_AUDIT,
    InvocationStatus,
};
pub use sink::{AuditLog, AuditSink, MemoryAuditSink, STRUCTURED_LOG_PREFIX, TracingAuditSink};
