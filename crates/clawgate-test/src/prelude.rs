//! Prelude module - commonly used test helpers.
//!
//! Use `use clawgate_test::prelude::*;` to import all essential helpers.

pub use crate::fixtures::{
    init_test_tracing, test_data_path_request, test_request_id, test_tenant, test_tool_request,
};
pub use crate::mocks::{
    ManualClock, MockProfileStore, RecordingAgentNotifier, RecordingApprovalChannel,
};
