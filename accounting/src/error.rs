use std::process::ExitStatus;

use thiserror::Error;

/// Why the accounting command did not produce usable output.
#[derive(Debug, Error)]
pub enum BackendFailure {
    #[error("could not be started: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("exited with {status}{}", fmt_stderr(.stderr))]
    Status { status: ExitStatus, stderr: String },
}

fn fmt_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

#[derive(Debug, Error)]
pub enum InquirerError {
    #[error("accounting backend unavailable, `{command}` {reason}")]
    BackendUnavailable {
        command: String,
        #[source]
        reason: BackendFailure,
    },
    /// Only raised under [`FieldCountPolicy::Strict`](crate::config::FieldCountPolicy::Strict).
    #[error("malformed accounting output, line {line}: expected {expected} fields, got {found}")]
    MalformedOutput { line: usize, expected: usize, found: usize },
    #[error("lookback of {0} days does not give a valid start date")]
    InvalidLookback(i64),
    #[error("invalid columns: {}", .0.join(", "))]
    UnknownColumns(Vec<String>),
}

impl InquirerError {
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}

pub type Result<T, E = InquirerError> = std::result::Result<T, E>;
