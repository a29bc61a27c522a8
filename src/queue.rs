use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::directory::ActorId;
use crate::state_machine::{ExpenseReport, ReportId, ReportStatus};

/// Scope policy deciding which submitted reports a supervisor may review.
///
/// This is configuration, not workflow logic: deployments wire whatever
/// organizational rule applies behind this trait.
pub trait ReviewScope: Send + Sync {
    fn can_review(&self, supervisor: ActorId, report: &ExpenseReport) -> bool;
}

/// Only reports that name this supervisor as their assigned reviewer.
pub struct AssignedSupervisor;

impl ReviewScope for AssignedSupervisor {
    fn can_review(&self, supervisor: ActorId, report: &ExpenseReport) -> bool {
        report.supervisor == Some(supervisor)
    }
}

/// Flat organizations: every supervisor reviews every submitted report.
pub struct AnySupervisor;

impl ReviewScope for AnySupervisor {
    fn can_review(&self, _supervisor: ActorId, _report: &ExpenseReport) -> bool {
        true
    }
}

/// Listing row derived from a report. Totals are computed at projection
/// time from the lines, like everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub employee: ActorId,
    pub status: ReportStatus,
    pub report_month: NaiveDate,
    pub line_count: usize,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<&ExpenseReport> for ReportSummary {
    fn from(report: &ExpenseReport) -> Self {
        Self {
            id: report.id,
            employee: report.employee,
            status: report.status,
            report_month: report.report_month,
            line_count: report.lines.len(),
            total: report.total(),
            created_at: report.created_at,
            submitted_at: report.submitted_at,
            decided_at: report.decided_at,
        }
    }
}

/// Submitted reports this supervisor may review, oldest submission first
/// so nothing starves at the back of the queue. Recomputed from the given
/// snapshot on every call; callers re-invoke to restart the sequence.
pub fn pending_for_supervisor(
    reports: &[ExpenseReport],
    supervisor: ActorId,
    scope: &dyn ReviewScope,
) -> Vec<ReportSummary> {
    let mut pending: Vec<&ExpenseReport> = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Submitted)
        .filter(|r| scope.can_review(supervisor, r))
        .collect();
    pending.sort_by_key(|r| (r.submitted_at, r.id));
    pending.into_iter().map(ReportSummary::from).collect()
}

/// All of an employee's reports across every status, most recent
/// activity first.
pub fn for_employee(reports: &[ExpenseReport], employee: ActorId) -> Vec<ReportSummary> {
    let mut own: Vec<&ExpenseReport> = reports
        .iter()
        .filter(|r| r.employee == employee)
        .collect();
    own.sort_by_key(|r| std::cmp::Reverse((r.last_activity(), r.id)));
    own.into_iter().map(ReportSummary::from).collect()
}
