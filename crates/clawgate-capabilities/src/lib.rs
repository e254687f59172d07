//! Clawgate Capabilities - Time-bounded approval tokens.
//!
//! This crate provides the [`TokenStore`], the registry of short-lived grants
//! minted when a human approves a temporary request.
//!
//! # Security Model
//!
//! Every approval token is:
//! - Keyed by `(tenant, resource)`, with at most one live token per key
//! - Capped at 24 hours regardless of the requested lifetime
//! - Never renewed; a later issue overwrites, it does not extend
//! - Expired lazily: the first validation after expiry deletes it
//!
//! # Example
//!
//! ```
//! use clawgate_capabilities::TokenStore;
//! use clawgate_core::TenantId;
//!
//! let store = TokenStore::new();
//! let tenant = TenantId::new("acme");
//!
//! let token = store.issue(&tenant, "shell", 48);
//! assert_eq!(token.ttl().num_hours(), 24);
//! assert!(store.validate(&tenant, "shell"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod store;

pub use store::{MAX_TOKEN_TTL_HOURS, TokenStore};
