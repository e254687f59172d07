//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_approval::prelude::*;` to import all essential types.

pub use crate::{
    ApprovalDecision, ApprovalError, ApprovalResult, ApprovalWorkflow, Decision, DenialCause,
    Grant, PermissionEnforcer, RiskAssessment, RiskCatalogue, SubmitReceipt, WorkflowSettings,
};
