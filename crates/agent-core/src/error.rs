//! Error types for agent-core

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failed model-backend interaction
///
/// The kind survives the trip from the HTTP provider up to the CLI and the
/// REST gateway, where it decides the exit code or status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendFailureKind {
    /// The backend host could not be reached
    Unreachable,
    /// The request did not complete within the configured timeout
    Timeout,
    /// The backend rejected the credentials
    Authentication,
    /// The backend reported a rate limit
    RateLimited,
    /// The backend refused the tool calls the model tried to make
    ToolCallRejected,
    /// The configured model does not exist on the backend
    ModelNotFound,
    /// The backend rejected the request as malformed
    InvalidRequest,
    /// The backend answered with something we could not interpret
    UnexpectedResponse,
    /// The tool-calling loop ended without a final answer
    Incomplete,
    /// Anything else
    Other,
}

impl BackendFailureKind {
    /// Stable snake_case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Timeout => "timeout",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::ToolCallRejected => "tool_call_rejected",
            Self::ModelNotFound => "model_not_found",
            Self::InvalidRequest => "invalid_request",
            Self::UnexpectedResponse => "unexpected_response",
            Self::Incomplete => "incomplete",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for BackendFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// The model backend failed
    #[error("Backend error ({kind}): {message}")]
    Backend {
        kind: BackendFailureKind,
        message: String,
    },
}

impl Error {
    /// Shorthand for a backend failure
    pub fn backend(kind: BackendFailureKind, message: impl Into<String>) -> Self {
        Self::Backend {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_match_serde() {
        for kind in [
            BackendFailureKind::Unreachable,
            BackendFailureKind::ToolCallRejected,
            BackendFailureKind::RateLimited,
            BackendFailureKind::Incomplete,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.as_str()));
        }
    }

    #[test]
    fn test_backend_error_display() {
        let err = Error::backend(BackendFailureKind::Timeout, "no answer after 120s");
        assert_eq!(
            err.to_string(),
            "Backend error (timeout): no answer after 120s"
        );
    }
}
