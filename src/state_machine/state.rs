use std::fmt;

use serde::{Deserialize, Serialize};

/// The four states of the expense report lifecycle.
///
/// Reports flow Draft → Submitted → {Approved, Rejected}, and a rejected
/// report may be reopened to Draft by its owner for correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Draft => write!(f, "Draft"),
            ReportStatus::Submitted => write!(f, "Submitted"),
            ReportStatus::Approved => write!(f, "Approved"),
            ReportStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Named transitions, one per edge of the lifecycle.
///
/// Creation is not an action here: a report is born in Draft and only
/// existing reports are acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportAction {
    Submit,
    Approve,
    Reject,
    Reopen,
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportAction::Submit => write!(f, "submit"),
            ReportAction::Approve => write!(f, "approve"),
            ReportAction::Reject => write!(f, "reject"),
            ReportAction::Reopen => write!(f, "reopen"),
        }
    }
}

/// The report lifecycle transition table.
pub struct StateMachine;

impl StateMachine {
    /// The state a report must currently be in for the action to apply.
    pub fn required_from(action: ReportAction) -> ReportStatus {
        match action {
            ReportAction::Submit => ReportStatus::Draft,
            ReportAction::Approve | ReportAction::Reject => ReportStatus::Submitted,
            ReportAction::Reopen => ReportStatus::Rejected,
        }
    }

    /// The state the action moves a report into.
    pub fn target(action: ReportAction) -> ReportStatus {
        match action {
            ReportAction::Submit => ReportStatus::Submitted,
            ReportAction::Approve => ReportStatus::Approved,
            ReportAction::Reject => ReportStatus::Rejected,
            ReportAction::Reopen => ReportStatus::Draft,
        }
    }

    /// Evaluate one edge of the table.
    ///
    /// Returns the target state, or `(found, expected)` when the report is
    /// not in the state the action requires. Callers map the error pair to
    /// an `InvalidTransition`; a wrong-state attempt never silently no-ops.
    pub fn apply(
        current: ReportStatus,
        action: ReportAction,
    ) -> Result<ReportStatus, (ReportStatus, ReportStatus)> {
        let expected = Self::required_from(action);
        if current == expected {
            Ok(Self::target(action))
        } else {
            Err((current, expected))
        }
    }

    /// Lines may be added, edited, or removed only while the report is in
    /// this state.
    pub fn lines_mutable(status: ReportStatus) -> bool {
        matches!(status, ReportStatus::Draft)
    }
}
