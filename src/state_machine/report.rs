use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::ActorId;

use super::state::ReportStatus;

/// Identity of an expense report.
pub type ReportId = Uuid;

/// Outcome of a supervisor's line-level review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineReview {
    Approved,
    Rejected,
}

/// Individual expense row attached to a report.
///
/// Line ids are 1-based and unique within their report; they are
/// reassigned whenever the draft's lines are replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u32,
    pub date: NaiveDate,
    pub gl_account: String,
    pub category: String,
    pub vendor: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_status: Option<LineReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
}

/// Input for one draft line. Ids and review fields are owned by the
/// report; callers only supply the expense data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDraft {
    pub date: NaiveDate,
    pub gl_account: String,
    pub category: String,
    pub vendor: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

/// Expense report header plus its ordered lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseReport {
    pub id: ReportId,
    pub employee: ActorId,
    pub supervisor: Option<ActorId>,
    pub status: ReportStatus,
    pub report_month: NaiveDate,
    pub notes: String,
    pub lines: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_note: Option<String>,
    pub reviewer: Option<ActorId>,
}

impl ExpenseReport {
    /// Create an empty draft owned by `employee` for the given month.
    pub fn new(employee: ActorId, report_month: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee,
            supervisor: None,
            status: ReportStatus::Draft,
            report_month: first_of_month(report_month),
            notes: String::new(),
            lines: Vec::new(),
            created_at: Utc::now(),
            submitted_at: None,
            decided_at: None,
            decision_note: None,
            reviewer: None,
        }
    }

    /// Sum of line amounts. Always derived from the current lines, never
    /// stored, so the total cannot drift.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Replace all lines, renumbering them sequentially from 1.
    pub fn set_lines(&mut self, drafts: Vec<LineDraft>) {
        self.lines = drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| LineItem {
                id: (i + 1) as u32,
                date: d.date,
                gl_account: d.gl_account,
                category: d.category,
                vendor: d.vendor,
                description: d.description,
                amount: d.amount,
                receipt_url: d.receipt_url,
                review_status: None,
                review_comment: None,
            })
            .collect();
    }

    /// Most recent activity on the report, used to order employee listings.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.created_at
            .max(self.submitted_at.unwrap_or(self.created_at))
            .max(self.decided_at.unwrap_or(self.created_at))
    }
}

/// Normalize any date within a month to that month's first day.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Immutable log entry capturing one lifecycle transition.
///
/// `from` is `None` for the creation record. Audit history is only ever
/// appended, never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub report_id: ReportId,
    pub actor: ActorId,
    pub from: Option<ReportStatus>,
    pub to: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        report_id: ReportId,
        actor: ActorId,
        from: Option<ReportStatus>,
        to: ReportStatus,
        note: Option<String>,
    ) -> Self {
        Self {
            report_id,
            actor,
            from,
            to,
            note,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(date: NaiveDate, gl: &str, category: &str, amount: &str) -> LineDraft {
        LineDraft {
            date,
            gl_account: gl.to_string(),
            category: category.to_string(),
            vendor: "Acme Travel".to_string(),
            description: "client visit".to_string(),
            amount: amount.parse().unwrap(),
            receipt_url: None,
        }
    }

    #[test]
    fn new_report_is_empty_draft() {
        let employee = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let report = ExpenseReport::new(employee, month);

        assert_eq!(report.status, ReportStatus::Draft);
        assert_eq!(report.employee, employee);
        assert_eq!(report.report_month, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(report.lines.is_empty());
        assert!(report.supervisor.is_none());
        assert!(report.submitted_at.is_none());
        assert!(report.decided_at.is_none());
        assert!(report.decision_note.is_none());
        assert!(report.reviewer.is_none());
        assert_eq!(report.total(), Decimal::ZERO);
    }

    #[test]
    fn total_is_sum_of_line_amounts() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut report = ExpenseReport::new(Uuid::new_v4(), date);
        report.set_lines(vec![
            draft(date, "6000", "Travel", "120.00"),
            draft(date, "6100", "Meals", "35.50"),
        ]);

        assert_eq!(report.total(), "155.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn set_lines_renumbers_from_one() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut report = ExpenseReport::new(Uuid::new_v4(), date);
        report.set_lines(vec![
            draft(date, "6000", "Travel", "10.00"),
            draft(date, "6100", "Meals", "20.00"),
            draft(date, "6200", "Office", "30.00"),
        ]);

        let ids: Vec<u32> = report.lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // Replacing lines assigns fresh ids and clears review fields.
        report.lines[0].review_status = Some(LineReview::Rejected);
        report.set_lines(vec![draft(date, "6100", "Meals", "20.00")]);
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].id, 1);
        assert!(report.lines[0].review_status.is_none());
    }

    #[test]
    fn last_activity_prefers_latest_timestamp() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut report = ExpenseReport::new(Uuid::new_v4(), date);
        assert_eq!(report.last_activity(), report.created_at);

        let later = report.created_at + chrono::Duration::hours(1);
        report.submitted_at = Some(later);
        assert_eq!(report.last_activity(), later);

        let latest = later + chrono::Duration::hours(2);
        report.decided_at = Some(latest);
        assert_eq!(report.last_activity(), latest);
    }

    #[test]
    fn report_serialization_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut report = ExpenseReport::new(Uuid::new_v4(), date);
        report.set_lines(vec![draft(date, "6000", "Travel", "120.00")]);

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ExpenseReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn audit_record_creation_edge_has_no_from() {
        let record = AuditRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            ReportStatus::Draft,
            None,
        );
        assert!(record.from.is_none());
        assert_eq!(record.to, ReportStatus::Draft);
        assert!(record.note.is_none());
    }
}
