//! Time source abstraction.

use std::fmt;

use crate::types::Timestamp;

/// Source of the current time.
///
/// Token expiry and pending-request bookkeeping read time through this trait
/// so tests can move time forward without sleeping.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
