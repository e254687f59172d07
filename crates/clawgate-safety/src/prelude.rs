//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_safety::prelude::*;` to import all essential types.

pub use crate::{
    InMemoryMemoryStore, MemoryGate, MemoryStore, SafetyError, SafetyFilter, SafetyLimits,
    SafetyResult, SafetyViolation, SaveOutcome,
};
