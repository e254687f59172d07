//! Clawgate Gateway - one facade over the authorization subsystem.
//!
//! [`Gatekeeper::from_config`] builds the safety filter, token store,
//! enforcer, approval workflow, and memory gate from a loaded
//! [`clawgate_config::Config`]. The host supplies the approval channel and
//! the agent notifier through [`Collaborators`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clawgate_config::Config;
//! use clawgate_core::{LoggingAgentNotifier, LoggingApprovalChannel, TenantId};
//! use clawgate_gateway::{Authorization, Collaborators, Gatekeeper, RequestedGrant};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolved = Config::load(None)?;
//! let gate = Gatekeeper::from_config(
//!     &resolved.config,
//!     Collaborators::new(Arc::new(LoggingApprovalChannel), Arc::new(LoggingAgentNotifier)),
//! )?;
//!
//! let tenant = TenantId::new("acme");
//! match gate.authorize_tool(&tenant, "shell", "run the build", RequestedGrant::default())? {
//!     Authorization::Allowed(_) => println!("go ahead"),
//!     Authorization::PendingApproval { request_id, .. } => println!("waiting on {request_id}"),
//!     other => println!("refused: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod config_bridge;
/// Error types for the gateway.
pub mod error;
pub mod gatekeeper;

pub use error::{GatewayError, GatewayResult};
pub use gatekeeper::{Authorization, Collaborators, Gatekeeper, RequestedGrant};
