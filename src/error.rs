use std::fmt;

use http::StatusCode;

/// A single flattened constraint failure.
///
/// `path` is dotted (`address.city`) with `[i]` for list indices
/// (`tags[2]`); `code` is the constraint code reported by the validator
/// (`email`, `length`, `range`, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Issue {
    pub path: String,
    pub code: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Error produced by every adapter in this crate.
///
/// Carries the HTTP status the framework integration should respond with,
/// a human readable message, and (for constraint failures) the list of
/// [`Issue`]s that caused it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
    issues: Vec<Issue>,
}

impl HttpError {
    /// Create an error with an explicit status.
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    /// `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    /// `500 Internal Server Error`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// `413 Payload Too Large`.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// Attach constraint issues.
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// `true` for `5xx` statuses, i.e. failures not caused by the client.
    pub fn is_internal(&self) -> bool {
        self.status.is_server_error()
    }
}
