use thiserror::Error;

use crate::state_machine::{ReportId, ReportStatus};

#[derive(Debug, Error)]
pub enum DespesaError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Reference data error: {0}")]
    ReferenceData(#[from] crate::refdata::ReferenceDataError),

    #[error("Receipt storage error: {0}")]
    Receipt(#[from] crate::receipts::ReceiptError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A single field-level validation failure, addressable by the caller
/// so a form layer can render feedback next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors returned by workflow operations.
///
/// Every variant is recoverable by a different party: `Validation` by the
/// submitting user, `InvalidTransition` by refetching current state,
/// `PermissionDenied` not at all, and `ServiceUnavailable` by operator
/// action on the reference workbook.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {}", format_violations(.0))]
    Validation(Vec<Violation>),

    #[error("invalid transition: report is {found}, expected {expected}")]
    InvalidTransition {
        found: ReportStatus,
        expected: ReportStatus,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("reference data unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("report not found: {0}")]
    NotFound(ReportId),

    #[error("internal storage failure: {0}")]
    Internal(String),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_fields() {
        let err = WorkflowError::Validation(vec![
            Violation::new("lines[0].amount", "must be positive"),
            Violation::new("lines[1].description", "must not be empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: lines[0].amount: must be positive; \
             lines[1].description: must not be empty"
        );
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = WorkflowError::InvalidTransition {
            found: ReportStatus::Approved,
            expected: ReportStatus::Submitted,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition: report is Approved, expected Submitted"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorkflowError>();
        assert_send_sync::<DespesaError>();
    }
}
