//! Clawgate Core - Foundation types and traits for the clawgate authorization subsystem.
//!
//! This crate provides:
//! - Identifier newtypes for tenants, requests, and tokens
//! - The approval token, permission profile, and approval request data model
//! - The [`Clock`] seam used by every time-dependent component
//! - Collaborator traits for profile storage, the human approval channel,
//!   and agent notification
//! - The [`SecurityError`] taxonomy shared by the rest of the workspace

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod clock;
pub mod collaborators;
pub mod error;
pub mod profile;
pub mod request;
pub mod types;
pub mod utils;

pub use clock::{Clock, SystemClock};
pub use collaborators::{
    AgentNotifier, HumanApprovalChannel, LoggingAgentNotifier, LoggingApprovalChannel,
    ProfileStore,
};
pub use error::{SecurityError, SecurityResult};
pub use profile::{DataPermissions, PermissionProfile};
pub use request::{AgentOutcome, ApprovalRequest, ApprovalToken, OutcomeStatus};
pub use types::{
    DurationType, RequestId, RequestStatus, ResourceType, RiskLevel, TenantId, Timestamp, TokenId,
};
pub use utils::{normalize_prefix, truncate_chars};
