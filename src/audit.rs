//! Per-request audit records.
//!
//! The orchestrator receives its sink at construction time; nothing here is
//! global, so tests can each hold their own [`MemoryAuditSink`].

use crate::{FidelityReport, FidelityStatus};
use parking_lot::Mutex;
use serde::Serialize;

/// What the orchestrator reports for every completed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub filename: String,
    pub status: FidelityStatus,
    pub report: FidelityReport,
}

impl AuditRecord {
    pub fn new(filename: impl Into<String>, report: FidelityReport) -> Self {
        Self {
            filename: filename.into(),
            status: report.status(),
            report,
        }
    }
}

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Writes each record as one structured `info` event on target `job_audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        match serde_json::to_string(record) {
            Ok(json) => tracing::info!(
                target: "job_audit",
                filename = %record.filename,
                status = %record.status,
                record = %json,
                "JOB_AUDIT"
            ),
            Err(e) => tracing::warn!(target: "job_audit", error = %e, "audit record not serializable"),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        self.records.lock().push(record.clone());
    }
}
