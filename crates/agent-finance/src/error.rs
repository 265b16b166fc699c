//! Error types for financial query operations

use agent_core::BackendFailureKind;
use agent_tools::{ToolError, ToolErrorKind};
use thiserror::Error;

/// Errors surfaced by the dispatcher to the CLI and REST layers
#[derive(Debug, Error)]
pub enum FinanceError {
    /// Missing or malformed configuration, raised before any agent exists
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The agent selector is not one of financial / web / multi
    #[error("Invalid agent type '{selector}'. Choose from: financial, web, multi")]
    InvalidSelector { selector: String },

    /// The query was empty after trimming
    #[error("Query must not be empty")]
    EmptyQuery,

    /// The model backend failed or refused the request
    #[error("Backend error ({kind}): {message}")]
    Backend {
        kind: BackendFailureKind,
        message: String,
    },
}

impl FinanceError {
    /// Stable label used in REST error payloads and CLI output
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::InvalidSelector { .. } | Self::EmptyQuery => "validation_error",
            Self::Backend { .. } => "backend_error",
        }
    }
}

/// Result type alias for dispatcher operations
pub type Result<T> = std::result::Result<T, FinanceError>;

impl From<agent_core::Error> for FinanceError {
    fn from(err: agent_core::Error) -> Self {
        match err {
            agent_core::Error::Backend { kind, message } => Self::Backend { kind, message },
            agent_core::Error::InitializationFailed(msg) => Self::Configuration(msg),
            agent_core::Error::ProcessingFailed(msg) => Self::Backend {
                kind: BackendFailureKind::Other,
                message: msg,
            },
        }
    }
}

impl From<agent_llm::LLMError> for FinanceError {
    fn from(err: agent_llm::LLMError) -> Self {
        agent_core::Error::from(err).into()
    }
}

/// Errors from the market-data and search clients
#[derive(Debug, Error)]
pub enum DataError {
    /// Provider has no data for the symbol
    #[error("No data found for ticker {0}")]
    TickerNotFound(String),

    /// Provider needs a key that is not configured
    #[error("{provider} API key is not configured (set {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// Provider throttled the request
    #[error("{0} rate limit exceeded")]
    RateLimited(String),

    /// Provider answered with an error status
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Transport failure
    #[error("Network error: {0}")]
    Http(reqwest::Error),

    /// Provider answered with something we could not read
    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// Provider served a bot-check page instead of results
    #[error("{0} blocked the request with a bot check")]
    Blocked(String),
}

/// Result type alias for data-provider calls
pub type DataResult<T> = std::result::Result<T, DataError>;

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        // URLs can carry credentials in query strings
        Self::Http(err.without_url())
    }
}

impl DataError {
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<DataError> for ToolError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::TickerNotFound(symbol) => ToolError::new(
                ToolErrorKind::NotFound,
                format!(
                    "No data found for ticker {symbol}. Please verify the symbol is correct \
                     (for example AAPL for Apple or NVDA for NVIDIA)."
                ),
            ),
            DataError::MissingApiKey { provider, env_var } => ToolError::unavailable(format!(
                "{provider} data is unavailable because {env_var} is not set"
            )),
            DataError::RateLimited(provider) => ToolError::new(
                ToolErrorKind::RateLimited,
                format!("{provider} rate limit reached, try again shortly"),
            ),
            other => ToolError::upstream(other.to_string()),
        }
    }
}
