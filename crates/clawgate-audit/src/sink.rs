//! Audit sinks and the clock-stamped audit log front end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use clawgate_core::{Clock, SystemClock};

use crate::error::{AuditError, AuditResult};
use crate::event::{AuditEvent, AuditRecord};

/// Prefix that marks a structured audit line in the log stream.
pub const STRUCTURED_LOG_PREFIX: &str = "STRUCTURED_LOG";

/// Destination for audit records.
///
/// Implementations must be thread-safe; they are called from every tenant
/// session concurrently.
pub trait AuditSink: Send + Sync {
    /// Persist or forward one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn record(&self, record: &AuditRecord) -> AuditResult<()>;
}

/// Sink that writes each record as `STRUCTURED_LOG {json}` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> AuditResult<()> {
        let json = serde_json::to_string(record)?;
        info!(target: "clawgate::audit", "{STRUCTURED_LOG_PREFIX} {json}");
        Ok(())
    }
}

/// Sink that keeps records in memory, for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
    fail: AtomicBool,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Records whose `event_type` equals `event_type`.
    #[must_use]
    pub fn of_type(&self, event_type: &str) -> Vec<AuditRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event.event_type() == event_type)
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject every subsequent record (or accept them again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) -> AuditResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuditError::SinkError("memory sink set to fail".to_string()));
        }
        self.records
            .lock()
            .map_err(|e| AuditError::SinkError(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}

/// Stamps events with the current time and hands them to a sink.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AuditLog {
    /// Create a log writing to `sink` on the system clock.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock))
    }

    /// Create a log writing to `sink`, stamping with `clock`.
    #[must_use]
    pub fn with_clock(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// Log backed by [`TracingAuditSink`].
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    /// Record `event`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error; the failure is also logged.
    pub fn emit(&self, event: AuditEvent) -> AuditResult<AuditRecord> {
        let record = AuditRecord::new(event, self.clock.now());
        if let Err(e) = self.sink.record(&record) {
            error!(
                event_type = record.event.event_type(),
                tenant_id = %record.event.tenant_id(),
                error = %e,
                "failed to write audit record"
            );
            return Err(e);
        }
        Ok(record)
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}
