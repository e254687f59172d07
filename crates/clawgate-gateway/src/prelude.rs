//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_gateway::prelude::*;` to import all essential types.

pub use crate::{
    Authorization, Collaborators, Gatekeeper, GatewayError, GatewayResult, RequestedGrant,
};
