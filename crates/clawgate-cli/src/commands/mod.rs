//! CLI commands.

pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod profile;
pub(crate) mod scan;
