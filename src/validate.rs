use rust_decimal::Decimal;

use crate::error::Violation;
use crate::refdata::RefDataSnapshot;
use crate::state_machine::{ExpenseReport, LineItem};

/// Pure validation of a draft report. Returns every violation at once so
/// a form layer can render all field-level feedback in one pass; never
/// mutates the report.
pub struct Validator;

impl Validator {
    /// Structural rules only, applied while the owner is editing lines.
    ///
    /// Reference-set membership is deliberately not checked here: the
    /// workbook may change between drafting and submission, so membership
    /// is only authoritative at submit time.
    pub fn check_structure(report: &ExpenseReport) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        check_has_lines(report, &mut violations);
        for (index, line) in report.lines.iter().enumerate() {
            check_line_structure(index, line, &mut violations);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Full submission check: structure plus membership of every line's
    /// GL account and category in the current reference snapshot.
    pub fn check_for_submission(
        report: &ExpenseReport,
        refdata: &RefDataSnapshot,
    ) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        check_has_lines(report, &mut violations);
        let gl_codes = refdata.gl_codes();
        for (index, line) in report.lines.iter().enumerate() {
            check_line_structure(index, line, &mut violations);
            if !line.gl_account.is_empty() && !gl_codes.contains(line.gl_account.as_str()) {
                violations.push(Violation::new(
                    field(index, "gl_account"),
                    "select a GL account from the approved list",
                ));
            }
            if !line.category.is_empty() && !refdata.has_category(&line.category) {
                violations.push(Violation::new(
                    field(index, "category"),
                    "select a category from the standardized list",
                ));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn check_has_lines(report: &ExpenseReport, violations: &mut Vec<Violation>) {
    if report.lines.is_empty() {
        violations.push(Violation::new("lines", "add at least one expense line"));
    }
}

fn check_line_structure(index: usize, line: &LineItem, violations: &mut Vec<Violation>) {
    if line.amount <= Decimal::ZERO {
        violations.push(Violation::new(field(index, "amount"), "must be positive"));
    } else if line.amount != line.amount.round_dp(2) {
        violations.push(Violation::new(
            field(index, "amount"),
            "amounts carry at most two decimal places",
        ));
    }
    if line.description.trim().is_empty() {
        violations.push(Violation::new(
            field(index, "description"),
            "must not be empty",
        ));
    }
    if line.vendor.trim().is_empty() {
        violations.push(Violation::new(field(index, "vendor"), "must not be empty"));
    }
    if line.gl_account.trim().is_empty() {
        violations.push(Violation::new(
            field(index, "gl_account"),
            "must not be empty",
        ));
    }
    if line.category.trim().is_empty() {
        violations.push(Violation::new(
            field(index, "category"),
            "must not be empty",
        ));
    }
}

fn field(index: usize, name: &str) -> String {
    format!("lines[{index}].{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::refdata::StaticRefData;
    use crate::refdata::ReferenceData;
    use crate::state_machine::LineDraft;

    fn refdata() -> RefDataSnapshot {
        let provider = StaticRefData::new(
            &[("6000", "Travel"), ("6100", "Meals")],
            &["Travel", "Meals"],
        );
        provider.snapshot().unwrap().as_ref().clone()
    }

    fn line(gl: &str, category: &str, amount: &str) -> LineDraft {
        LineDraft {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            gl_account: gl.to_string(),
            category: category.to_string(),
            vendor: "Acme Travel".to_string(),
            description: "client visit".to_string(),
            amount: amount.parse().unwrap(),
            receipt_url: None,
        }
    }

    fn report_with(lines: Vec<LineDraft>) -> ExpenseReport {
        let mut report = ExpenseReport::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        report.set_lines(lines);
        report
    }

    #[test]
    fn valid_report_passes_both_checks() {
        let report = report_with(vec![line("6000", "Travel", "120.00")]);
        assert!(Validator::check_structure(&report).is_ok());
        assert!(Validator::check_for_submission(&report, &refdata()).is_ok());
    }

    #[test]
    fn empty_report_fails_with_lines_violation() {
        let report = report_with(vec![]);
        let violations = Validator::check_structure(&report).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "lines");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let report = report_with(vec![line("6000", "Travel", "0"), line("6100", "Meals", "-5.00")]);
        let violations = Validator::check_structure(&report).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["lines[0].amount", "lines[1].amount"]);
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        let report = report_with(vec![line("6000", "Travel", "10.005")]);
        let violations = Validator::check_structure(&report).unwrap_err();
        assert_eq!(violations[0].field, "lines[0].amount");
        assert!(violations[0].reason.contains("two decimal places"));
    }

    #[test]
    fn blank_fields_are_each_reported() {
        let mut bad = line("", "", "12.00");
        bad.vendor = "  ".to_string();
        bad.description = String::new();
        let report = report_with(vec![bad]);

        let violations = Validator::check_structure(&report).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"lines[0].description"));
        assert!(fields.contains(&"lines[0].vendor"));
        assert!(fields.contains(&"lines[0].gl_account"));
        assert!(fields.contains(&"lines[0].category"));
    }

    #[test]
    fn submission_requires_reference_membership() {
        let report = report_with(vec![line("9999", "Rocketry", "50.00")]);
        // Structure is fine; membership is not.
        assert!(Validator::check_structure(&report).is_ok());

        let violations = Validator::check_for_submission(&report, &refdata()).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["lines[0].gl_account", "lines[0].category"]);
    }

    #[test]
    fn duplicate_lines_are_allowed() {
        let report = report_with(vec![
            line("6000", "Travel", "120.00"),
            line("6000", "Travel", "120.00"),
        ]);
        assert!(Validator::check_for_submission(&report, &refdata()).is_ok());
    }

    #[test]
    fn checks_never_mutate_the_report() {
        let report = report_with(vec![line("9999", "Rocketry", "-1.00")]);
        let before = report.clone();
        let _ = Validator::check_for_submission(&report, &refdata());
        assert_eq!(report, before);
    }
}
