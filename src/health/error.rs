//! Check error types.

use std::fmt;

/// Error type returned by probe functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reason a check outcome is down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Placeholder state of a check that has not reported yet.
    Initial,

    /// The probe itself reported a fault (display text kept verbatim).
    Probe(String),

    /// The check did not finish within its timeout.
    DeadlineExceeded,

    /// The caller gave up waiting for the check.
    Canceled,

    /// Synthetic failure reported while the process is shutting down.
    ShuttingDown,
}

impl CheckError {
    /// Wrap any displayable probe error.
    pub fn probe(err: impl fmt::Display) -> Self {
        CheckError::Probe(err.to_string())
    }

    /// Returns true if the runner synthesized this error instead of the probe.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CheckError::DeadlineExceeded | CheckError::Canceled)
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Initial => write!(f, "initial"),
            CheckError::Probe(msg) => write!(f, "{}", msg),
            CheckError::DeadlineExceeded => write!(f, "context deadline exceeded"),
            CheckError::Canceled => write!(f, "context canceled"),
            CheckError::ShuttingDown => write!(f, "The application in shutting down process"),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<BoxError> for CheckError {
    fn from(err: BoxError) -> Self {
        CheckError::Probe(err.to_string())
    }
}

impl From<String> for CheckError {
    fn from(msg: String) -> Self {
        CheckError::Probe(msg)
    }
}

impl From<&str> for CheckError {
    fn from(msg: &str) -> Self {
        CheckError::Probe(msg.to_string())
    }
}
