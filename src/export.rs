use crate::directory::Directory;
use crate::state_machine::{ExpenseReport, LineReview, ReportStatus};

/// Column order of the accounting-upload CSV.
const HEADER: [&str; 10] = [
    "report_id",
    "employee_email",
    "supervisor_email",
    "expense_date",
    "expense_type",
    "gl_account",
    "vendor",
    "description",
    "amount",
    "receipt_url",
];

/// Serialize approved reports into a single accounting-ready CSV.
///
/// Non-approved reports are skipped. Within an approved report, a line
/// carrying a line-level rejection is excluded; a line with no explicit
/// review counts as approved. Amounts are rendered with exactly two
/// decimal places.
pub fn approved_reports_csv(
    reports: &[ExpenseReport],
    directory: &dyn Directory,
) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for report in reports {
        if report.status != ReportStatus::Approved {
            continue;
        }
        let employee_email = email_of(directory, Some(report.employee));
        let supervisor_email = email_of(directory, report.supervisor);
        for line in &report.lines {
            if line.review_status == Some(LineReview::Rejected) {
                continue;
            }
            writer.write_record([
                report.id.to_string(),
                employee_email.clone(),
                supervisor_email.clone(),
                line.date.to_string(),
                line.category.clone(),
                line.gl_account.clone(),
                line.vendor.clone(),
                line.description.clone(),
                format_amount(line.amount),
                line.receipt_url.clone().unwrap_or_default(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn email_of(directory: &dyn Directory, actor: Option<crate::directory::ActorId>) -> String {
    actor
        .and_then(|id| directory.lookup(id))
        .map(|p| p.email)
        .unwrap_or_default()
}

fn format_amount(amount: rust_decimal::Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}
