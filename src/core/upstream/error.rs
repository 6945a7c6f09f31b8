//! Per-attempt failure classification

use std::time::Duration;
use thiserror::Error;

/// Longest upstream body kept in an error, in characters
const MAX_BODY_CHARS: usize = 512;

/// Why one candidate attempt failed. Always recorded, never fatal on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// No complete response within the per-attempt timeout
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection, TLS or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a status counted as failure
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A success status whose body is not a chat completion
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The outbound body could not be built
    #[error("could not encode request: {0}")]
    Encoding(String),

    /// The inbound request went away mid-attempt
    #[error("cancelled by client")]
    Cancelled,
}

impl AttemptError {
    pub fn status(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{}...", truncated)
        } else {
            body.to_string()
        };
        AttemptError::Status { status, body }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout(_))
    }

    /// Short label for logs and headers
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Timeout(_) => "timeout",
            AttemptError::Network(_) => "network",
            AttemptError::Status { .. } => "status",
            AttemptError::MalformedResponse(_) => "malformed",
            AttemptError::Encoding(_) => "encoding",
            AttemptError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AttemptError::MalformedResponse(err.to_string())
        } else {
            AttemptError::Network(err.to_string())
        }
    }
}
