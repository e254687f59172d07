//! Clawgate Test - Shared test utilities for the clawgate workspace.
//!
//! This crate provides mock collaborators and fixtures that can be used
//! across multiple clawgate crates as a dev-dependency. It depends only on
//! `clawgate-core`, so any crate may pull it in without a cycle.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! clawgate-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use clawgate_test::{ManualClock, RecordingApprovalChannel};
//!
//! let clock = ManualClock::new();
//! clock.advance_hours(3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
