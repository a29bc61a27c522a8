use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::directory::{ActorId, Directory, Role};
use crate::error::{Violation, WorkflowError};
use crate::export;
use crate::queue::{self, ReportSummary, ReviewScope};
use crate::refdata::ReferenceData;
use crate::state_machine::{
    AuditRecord, ExpenseReport, LineDraft, LineReview, ReportAction, ReportId, ReportStatus,
    StateMachine, first_of_month,
};
use crate::store::{ReportStore, StoreError};
use crate::validate::Validator;

/// Supervisor decision on a whole submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// One line-level review decision. Rejections carry the comment the
/// employee will see while correcting the draft.
#[derive(Debug, Clone)]
pub struct LineDecision {
    pub line_id: u32,
    pub review: LineReview,
    pub comment: String,
}

/// Header fields the owner may edit while a report is in Draft.
#[derive(Debug, Clone)]
pub struct DraftHeader {
    pub supervisor: Option<ActorId>,
    pub report_month: NaiveDate,
    pub notes: String,
}

/// Report-level note recorded when any line is rejected during review.
const LINE_FEEDBACK_NOTE: &str = "Line-level feedback provided.";

/// Drives expense reports through the lifecycle state machine.
///
/// Every mutating operation follows the same shape: load the report,
/// evaluate the guards against the loaded state, apply the effects to a
/// local copy, then write it back with compare-on-status. Nothing is
/// partially applied: a failed guard leaves the store untouched, and a
/// lost race surfaces as `InvalidTransition`.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: Arc<dyn ReportStore>,
    refdata: Arc<dyn ReferenceData>,
    directory: Arc<dyn Directory>,
    scope: Arc<dyn ReviewScope>,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn ReportStore>,
        refdata: Arc<dyn ReferenceData>,
        directory: Arc<dyn Directory>,
        scope: Arc<dyn ReviewScope>,
    ) -> Self {
        Self {
            store,
            refdata,
            directory,
            scope,
        }
    }

    /// Create an empty draft for the current month, owned by `employee`.
    pub fn create_draft(&self, employee: ActorId) -> Result<ReportId, WorkflowError> {
        self.require_role(employee, Role::Employee, "create an expense report")?;

        let report = ExpenseReport::new(employee, Utc::now().date_naive());
        let id = report.id;
        self.store.insert(report).map_err(from_store)?;
        self.store.append_audit(AuditRecord::new(
            id,
            employee,
            None,
            ReportStatus::Draft,
            None,
        ));
        debug!(report = %id, "draft created");
        Ok(id)
    }

    /// Update the draft's header: assigned supervisor, month, and notes.
    pub fn update_draft_header(
        &self,
        report_id: ReportId,
        actor: ActorId,
        header: DraftHeader,
    ) -> Result<(), WorkflowError> {
        let mut report = self.load(report_id)?;
        require_owner(&report, actor)?;
        require_mutable(&report)?;

        if let Some(supervisor) = header.supervisor
            && self.directory.role_of(supervisor) != Some(Role::Supervisor)
        {
            return Err(WorkflowError::Validation(vec![Violation::new(
                "supervisor",
                "selected supervisor was not found",
            )]));
        }

        report.supervisor = header.supervisor;
        report.report_month = first_of_month(header.report_month);
        report.notes = header.notes;
        self.store
            .save(report, ReportStatus::Draft)
            .map_err(from_store)
    }

    /// Replace the draft's lines. Structural validation only; membership
    /// in the reference sets is checked at submission, when it counts.
    pub fn update_draft_lines(
        &self,
        report_id: ReportId,
        actor: ActorId,
        lines: Vec<LineDraft>,
    ) -> Result<(), WorkflowError> {
        let mut report = self.load(report_id)?;
        require_owner(&report, actor)?;
        require_mutable(&report)?;

        report.set_lines(lines);
        Validator::check_structure(&report).map_err(WorkflowError::Validation)?;
        self.store
            .save(report, ReportStatus::Draft)
            .map_err(from_store)
    }

    /// Draft → Submitted. Fails closed when reference data is unavailable:
    /// a report never enters review without its GL accounts and categories
    /// checked against the current chart of accounts.
    pub fn submit(&self, report_id: ReportId, actor: ActorId) -> Result<(), WorkflowError> {
        let mut report = self.load(report_id)?;
        require_owner(&report, actor)?;
        let from = report.status;
        let target = StateMachine::apply(from, ReportAction::Submit).map_err(invalid)?;

        let snapshot = self.refdata.snapshot().map_err(|e| {
            warn!(report = %report_id, error = %e, "submission blocked, reference data unavailable");
            WorkflowError::ServiceUnavailable(e.to_string())
        })?;
        Validator::check_for_submission(&report, &snapshot).map_err(WorkflowError::Validation)?;

        report.status = target;
        report.submitted_at = Some(Utc::now());
        report.decided_at = None;
        report.decision_note = None;
        report.reviewer = None;
        for line in &mut report.lines {
            line.review_status = None;
            line.review_comment = None;
        }
        self.save_transition(report, from, actor, None)
    }

    /// Submitted → Approved | Rejected, for the report as a whole.
    /// Rejections must carry a note explaining what to fix.
    pub fn decide(
        &self,
        report_id: ReportId,
        actor: ActorId,
        decision: Decision,
        note: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.require_role(actor, Role::Supervisor, "review expense reports")?;
        let mut report = self.load(report_id)?;
        self.require_scope(actor, &report)?;

        let from = report.status;
        let action = match decision {
            Decision::Approve => ReportAction::Approve,
            Decision::Reject => ReportAction::Reject,
        };
        let target = StateMachine::apply(from, action).map_err(invalid)?;

        let note = note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        if decision == Decision::Reject && note.is_none() {
            return Err(WorkflowError::Validation(vec![Violation::new(
                "note",
                "a rejection note is required",
            )]));
        }

        report.status = target;
        report.decided_at = Some(Utc::now());
        report.reviewer = Some(actor);
        report.decision_note = note.clone();
        self.save_transition(report, from, actor, note)
    }

    /// Line-by-line review of a submitted report. Every line must be
    /// decided; any rejected line returns the whole report as Rejected,
    /// otherwise it is Approved. Returns the resulting status.
    pub fn decide_lines(
        &self,
        report_id: ReportId,
        actor: ActorId,
        decisions: &[LineDecision],
    ) -> Result<ReportStatus, WorkflowError> {
        self.require_role(actor, Role::Supervisor, "review expense reports")?;
        let mut report = self.load(report_id)?;
        self.require_scope(actor, &report)?;

        let from = report.status;
        if from != ReportStatus::Submitted {
            return Err(WorkflowError::InvalidTransition {
                found: from,
                expected: ReportStatus::Submitted,
            });
        }
        if report.lines.is_empty() {
            return Err(WorkflowError::Validation(vec![Violation::new(
                "lines",
                "this report has no expense lines to review",
            )]));
        }

        let mut violations = Vec::new();
        let known: HashSet<u32> = report.lines.iter().map(|l| l.id).collect();
        let by_line: HashMap<u32, &LineDecision> =
            decisions.iter().map(|d| (d.line_id, d)).collect();
        for decision in decisions {
            if !known.contains(&decision.line_id) {
                violations.push(Violation::new(
                    format!("line_{}", decision.line_id),
                    "unknown expense line",
                ));
            }
        }

        let mut any_rejected = false;
        for line in &mut report.lines {
            match by_line.get(&line.id) {
                None => violations.push(Violation::new(
                    format!("line_{}", line.id),
                    "select approve or reject for every expense line",
                )),
                Some(decision) => match decision.review {
                    LineReview::Approved => {
                        line.review_status = Some(LineReview::Approved);
                        line.review_comment = None;
                    }
                    LineReview::Rejected => {
                        let comment = decision.comment.trim();
                        if comment.is_empty() {
                            violations.push(Violation::new(
                                format!("line_{}", line.id),
                                "provide a rejection comment for each rejected expense line",
                            ));
                        } else {
                            line.review_status = Some(LineReview::Rejected);
                            line.review_comment = Some(comment.to_string());
                            any_rejected = true;
                        }
                    }
                },
            }
        }
        if !violations.is_empty() {
            return Err(WorkflowError::Validation(violations));
        }

        let (target, note) = if any_rejected {
            (ReportStatus::Rejected, Some(LINE_FEEDBACK_NOTE.to_string()))
        } else {
            (ReportStatus::Approved, None)
        };
        report.status = target;
        report.decided_at = Some(Utc::now());
        report.reviewer = Some(actor);
        report.decision_note = note.clone();
        self.save_transition(report, from, actor, note)?;
        Ok(target)
    }

    /// Rejected → Draft, so the owner can correct and resubmit. Decision
    /// fields are cleared; line-level review comments are kept until the
    /// next submission so the feedback stays visible while editing.
    pub fn reopen(&self, report_id: ReportId, actor: ActorId) -> Result<(), WorkflowError> {
        let mut report = self.load(report_id)?;
        require_owner(&report, actor)?;

        let from = report.status;
        let target = StateMachine::apply(from, ReportAction::Reopen).map_err(invalid)?;

        report.status = target;
        report.decided_at = None;
        report.decision_note = None;
        report.reviewer = None;
        self.save_transition(report, from, actor, None)
    }

    /// Submitted reports this supervisor may review, oldest first.
    pub fn pending_for_supervisor(
        &self,
        supervisor: ActorId,
    ) -> Result<Vec<ReportSummary>, WorkflowError> {
        self.require_role(supervisor, Role::Supervisor, "list pending reviews")?;
        Ok(queue::pending_for_supervisor(
            &self.store.snapshot(),
            supervisor,
            self.scope.as_ref(),
        ))
    }

    /// The employee's own reports across all statuses, newest activity
    /// first.
    pub fn reports_for_employee(
        &self,
        employee: ActorId,
    ) -> Result<Vec<ReportSummary>, WorkflowError> {
        if self.directory.lookup(employee).is_none() {
            return Err(WorkflowError::PermissionDenied("unknown actor".to_string()));
        }
        Ok(queue::for_employee(&self.store.snapshot(), employee))
    }

    /// Serialize every approved report into one accounting-upload CSV.
    pub fn export_approved_csv(&self, actor: ActorId) -> Result<String, WorkflowError> {
        self.require_role(actor, Role::Admin, "export approved reports")?;

        let mut approved: Vec<ExpenseReport> = self
            .store
            .snapshot()
            .into_iter()
            .filter(|r| r.status == ReportStatus::Approved)
            .collect();
        approved.sort_by_key(|r| (r.created_at, r.id));
        export::approved_reports_csv(&approved, self.directory.as_ref())
            .map_err(|e| WorkflowError::Internal(e.to_string()))
    }

    /// Full transition history of a report, in append order.
    pub fn audit_trail(&self, report_id: ReportId) -> Vec<AuditRecord> {
        self.store.audit_for(report_id)
    }

    fn load(&self, report_id: ReportId) -> Result<ExpenseReport, WorkflowError> {
        self.store.load(report_id).map_err(from_store)
    }

    fn save_transition(
        &self,
        report: ExpenseReport,
        from: ReportStatus,
        actor: ActorId,
        note: Option<String>,
    ) -> Result<(), WorkflowError> {
        let id = report.id;
        let to = report.status;
        self.store.save(report, from).map_err(from_store)?;
        self.store
            .append_audit(AuditRecord::new(id, actor, Some(from), to, note));
        info!(report = %id, %from, %to, "transition applied");
        Ok(())
    }

    fn require_role(&self, actor: ActorId, role: Role, what: &str) -> Result<(), WorkflowError> {
        match self.directory.role_of(actor) {
            Some(found) if found == role => Ok(()),
            Some(_) => Err(WorkflowError::PermissionDenied(format!(
                "{role} role is required to {what}"
            ))),
            None => Err(WorkflowError::PermissionDenied("unknown actor".to_string())),
        }
    }

    fn require_scope(&self, actor: ActorId, report: &ExpenseReport) -> Result<(), WorkflowError> {
        if self.scope.can_review(actor, report) {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied(
                "you are not assigned to this report".to_string(),
            ))
        }
    }
}

fn require_owner(report: &ExpenseReport, actor: ActorId) -> Result<(), WorkflowError> {
    if report.employee == actor {
        Ok(())
    } else {
        Err(WorkflowError::PermissionDenied(
            "only the report's owner may do this".to_string(),
        ))
    }
}

fn require_mutable(report: &ExpenseReport) -> Result<(), WorkflowError> {
    if StateMachine::lines_mutable(report.status) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition {
            found: report.status,
            expected: ReportStatus::Draft,
        })
    }
}

fn invalid((found, expected): (ReportStatus, ReportStatus)) -> WorkflowError {
    WorkflowError::InvalidTransition { found, expected }
}

fn from_store(err: StoreError) -> WorkflowError {
    match err {
        StoreError::NotFound(id) => WorkflowError::NotFound(id),
        StoreError::StatusConflict { expected, actual } => WorkflowError::InvalidTransition {
            found: actual,
            expected,
        },
        StoreError::DuplicateId(id) => {
            WorkflowError::Internal(format!("duplicate report id {id}"))
        }
    }
}
