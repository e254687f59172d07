//! Test fixtures for common types.

use clawgate_core::{ApprovalRequest, RequestId, ResourceType, TenantId};

/// Create the default test tenant.
#[must_use]
pub fn test_tenant() -> TenantId {
    TenantId::new("tenant-test")
}

/// Create a fresh request ID.
#[must_use]
pub fn test_request_id() -> RequestId {
    RequestId::new()
}

/// Create a temporary tool request for `tool` with a one-hour suggestion.
#[must_use]
pub fn test_tool_request(tool: &str) -> ApprovalRequest {
    ApprovalRequest::new(test_tenant(), ResourceType::Tool, tool)
        .with_reason(format!("agent needs {tool} to finish the task"))
}

/// Create a temporary data-path request.
#[must_use]
pub fn test_data_path_request(path: &str) -> ApprovalRequest {
    ApprovalRequest::new(test_tenant(), ResourceType::DataPath, path)
        .with_reason("agent needs to read project data")
}

/// Install a test-writer tracing subscriber once per process.
///
/// Honours `RUST_LOG`; subsequent calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
