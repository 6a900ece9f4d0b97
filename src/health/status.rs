//! Outcome and report types.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

use super::error::CheckError;

/// Up/down verdict of a single check or of a whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Status::Up)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluation of a check: when it happened and whether it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub at: OffsetDateTime,
    pub result: Result<(), CheckError>,
}

impl Outcome {
    pub fn new(at: OffsetDateTime, result: Result<(), CheckError>) -> Self {
        Self { at, result }
    }

    /// Outcome stamped with the current UTC time.
    pub fn now(result: Result<(), CheckError>) -> Self {
        Self::new(OffsetDateTime::now_utc(), result)
    }

    pub fn status(&self) -> Status {
        if self.result.is_ok() {
            Status::Up
        } else {
            Status::Down
        }
    }

    pub fn error(&self) -> Option<&CheckError> {
        self.result.as_ref().err()
    }

    /// Display text of the error, if any.
    pub fn error_text(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Serializable view of this outcome.
    pub fn to_state(&self) -> CheckState {
        CheckState {
            actual_at: self.at,
            status: self.status(),
            error: self.error_text().unwrap_or_default(),
        }
    }
}

/// Serialized form of an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckState {
    #[serde(with = "time::serde::rfc3339")]
    pub actual_at: OffsetDateTime,
    pub status: Status,
    /// Empty when the check is up.
    pub error: String,
}

/// Per-check entry of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub state: CheckState,
    /// Earlier outcomes, most recent first, excluding `state`.
    pub previous: Vec<CheckState>,
}

/// Result of running every registered check once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub status: Status,
    pub checks: Vec<CheckReport>,
}

impl Report {
    /// Build a report, deriving the aggregate status from the entries.
    pub fn from_checks(checks: Vec<CheckReport>) -> Self {
        let status = if checks.iter().all(|c| c.state.status.is_up()) {
            Status::Up
        } else {
            Status::Down
        };

        Self { status, checks }
    }

    pub fn is_up(&self) -> bool {
        self.status.is_up()
    }

    /// Find an entry by check identity.
    pub fn check(&self, name: &str) -> Option<&CheckReport> {
        self.checks.iter().find(|c| c.name == name)
    }
}
