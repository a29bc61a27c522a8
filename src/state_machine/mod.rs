mod report;
mod state;

pub use report::{
    AuditRecord, ExpenseReport, LineDraft, LineItem, LineReview, ReportId, first_of_month,
};
pub use state::{ReportAction, ReportStatus, StateMachine};
