//! Prelude module - commonly used types for convenient import.
//!
//! Use `use clawgate_capabilities::prelude::*;` to import all essential types.

pub use crate::{MAX_TOKEN_TTL_HOURS, TokenStore};
