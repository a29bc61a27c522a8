use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::state_machine::{AuditRecord, ExpenseReport, ReportId, ReportStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report not found: {0}")]
    NotFound(ReportId),

    #[error("report already exists: {0}")]
    DuplicateId(ReportId),

    #[error("report moved to {actual}, expected {expected}")]
    StatusConflict {
        expected: ReportStatus,
        actual: ReportStatus,
    },
}

/// Durable store for reports and their append-only audit trail.
///
/// `save` carries compare-on-status semantics: the write lands only if the
/// stored report is still in `expected_status` at the moment of the write.
/// That single guarantee is what makes every workflow transition
/// serializable per report: the loser of a concurrent race observes
/// `StatusConflict` instead of clobbering the winner.
///
/// Reports are never deleted; they persist for audit.
pub trait ReportStore: Send + Sync {
    fn insert(&self, report: ExpenseReport) -> Result<(), StoreError>;

    fn load(&self, id: ReportId) -> Result<ExpenseReport, StoreError>;

    fn save(&self, report: ExpenseReport, expected_status: ReportStatus) -> Result<(), StoreError>;

    /// Point-in-time copy of every report, for the read-only projections.
    fn snapshot(&self) -> Vec<ExpenseReport>;

    fn append_audit(&self, record: AuditRecord);

    fn audit_for(&self, id: ReportId) -> Vec<AuditRecord>;
}

/// In-memory store. One mutex spans the compare and the write, which is
/// the whole of the atomicity story at this scale; a database-backed
/// implementation would use a conditional UPDATE instead.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    reports: HashMap<ReportId, ExpenseReport>,
    audit: Vec<AuditRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("report store mutex poisoned")
    }
}

impl ReportStore for MemoryStore {
    fn insert(&self, report: ExpenseReport) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.reports.contains_key(&report.id) {
            return Err(StoreError::DuplicateId(report.id));
        }
        inner.reports.insert(report.id, report);
        Ok(())
    }

    fn load(&self, id: ReportId) -> Result<ExpenseReport, StoreError> {
        self.lock()
            .reports
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn save(&self, report: ExpenseReport, expected_status: ReportStatus) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let current = inner
            .reports
            .get(&report.id)
            .ok_or(StoreError::NotFound(report.id))?;
        if current.status != expected_status {
            return Err(StoreError::StatusConflict {
                expected: expected_status,
                actual: current.status,
            });
        }
        inner.reports.insert(report.id, report);
        Ok(())
    }

    fn snapshot(&self) -> Vec<ExpenseReport> {
        self.lock().reports.values().cloned().collect()
    }

    fn append_audit(&self, record: AuditRecord) {
        self.lock().audit.push(record);
    }

    fn audit_for(&self, id: ReportId) -> Vec<AuditRecord> {
        self.lock()
            .audit
            .iter()
            .filter(|r| r.report_id == id)
            .cloned()
            .collect()
    }
}
