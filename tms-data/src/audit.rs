//! Audit sinks.

use std::sync::Arc;

use parking_lot::Mutex;
use tms_core::{AuditEntry, AuditSink, SinkError};

/// Keeps audit entries in memory, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded entry.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError> {
        self.entries.lock().push(entry);
        Ok(())
    }
}

/// Writes each audit entry as one JSON line to the `tms::audit` log
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError> {
        let line = serde_json::to_string(&entry).map_err(|err| SinkError::Rejected {
            message: err.to_string(),
        })?;
        log::info!(target: "tms::audit", "{line}");
        Ok(())
    }
}
