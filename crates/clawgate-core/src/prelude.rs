//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{SecurityError, SecurityResult};

// Identifiers and enums
pub use crate::{
    DurationType, RequestId, RequestStatus, ResourceType, RiskLevel, TenantId, Timestamp, TokenId,
};

// Data model
pub use crate::{
    AgentOutcome, ApprovalRequest, ApprovalToken, DataPermissions, OutcomeStatus,
    PermissionProfile,
};

// Seams
pub use crate::{AgentNotifier, Clock, HumanApprovalChannel, ProfileStore, SystemClock};
