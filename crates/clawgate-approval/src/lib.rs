//! Clawgate Approval - Permission enforcement and human-in-the-loop approval.
//!
//! This crate provides:
//! - [`PermissionEnforcer`]: always-blocked set, tenant profile, then approval
//!   tokens, in that order
//! - [`ApprovalWorkflow`]: the pending-request registry with a one-shot
//!   auto-reject timer per request
//! - [`RiskCatalogue`]: how a request is classified for the approver
//! - Profile stores: [`InMemoryProfileStore`] and [`JsonFileProfileStore`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use clawgate_approval::{InMemoryProfileStore, PermissionEnforcer};
//! use clawgate_audit::AuditLog;
//! use clawgate_capabilities::TokenStore;
//! use clawgate_core::TenantId;
//!
//! let enforcer = PermissionEnforcer::new(
//!     Arc::new(InMemoryProfileStore::new()),
//!     Arc::new(TokenStore::new()),
//!     AuditLog::tracing(),
//! );
//! let tenant = TenantId::new("acme");
//!
//! assert!(enforcer.check_tool(&tenant, "web_search").unwrap().is_allowed());
//! assert!(enforcer.check_tool(&tenant, "shell").unwrap().is_escalatable());
//! assert!(enforcer.check_tool(&tenant, "eval").unwrap().is_always_blocked());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod decision;
/// Error types and results for the approval module.
pub mod error;
pub mod notify;
pub mod policy;
pub mod profile_store;
pub mod risk;
pub mod workflow;

pub use decision::ApprovalDecision;
pub use error::{ApprovalError, ApprovalResult};
pub use notify::{PendingSummary, format_pending_list};
pub use policy::{
    ALWAYS_BLOCKED_TOOLS, API_ACCESS_TOOL, DATA_ACCESS_TOOL, Decision, DenialCause, Grant,
    PermissionEnforcer,
};
pub use profile_store::{InMemoryProfileStore, JsonFileProfileStore};
pub use risk::{RiskAssessment, RiskCatalogue};
pub use workflow::{ApprovalWorkflow, SubmitReceipt, WorkflowBuilder, WorkflowSettings};
