//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_audit::prelude::*;` to import all essential types.

pub use crate::{
    AuditError, AuditEvent, AuditLog, AuditRecord, AuditResult, AuditSink, InvocationStatus,
    MemoryAuditSink, TracingAuditSink,
};
