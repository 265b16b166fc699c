//! Error types for LLM operations

use agent_core::BackendFailureKind;
use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Backend host could not be reached
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The backend refused the model's tool calls
    #[error("Tool call rejected by backend: {0}")]
    ToolCallRejected(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Classify the error for callers that only care about the failure class
    pub fn kind(&self) -> BackendFailureKind {
        match self {
            Self::Unreachable(_) => BackendFailureKind::Unreachable,
            Self::Timeout(_) => BackendFailureKind::Timeout,
            Self::AuthenticationFailed => BackendFailureKind::Authentication,
            Self::RateLimitExceeded(_) => BackendFailureKind::RateLimited,
            Self::ToolCallRejected(_) => BackendFailureKind::ToolCallRejected,
            Self::ModelNotFound(_) => BackendFailureKind::ModelNotFound,
            Self::InvalidRequest(_) => BackendFailureKind::InvalidRequest,
            Self::SerializationError(_) | Self::UnexpectedResponse(_) => {
                BackendFailureKind::UnexpectedResponse
            }
            Self::HttpError(e) if e.is_timeout() => BackendFailureKind::Timeout,
            Self::HttpError(e) if e.is_connect() => BackendFailureKind::Unreachable,
            Self::RequestFailed(_) | Self::HttpError(_) | Self::ConfigurationError(_) => {
                BackendFailureKind::Other
            }
        }
    }
}

impl From<LLMError> for agent_core::Error {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::ConfigurationError(msg) => agent_core::Error::InitializationFailed(msg),
            other => agent_core::Error::Backend {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}
