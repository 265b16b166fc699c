//! Tool results

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure category reported by a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments missing or malformed
    InvalidArguments,
    /// The requested entity does not exist upstream
    NotFound,
    /// The tool's data source is not configured
    Unavailable,
    /// The upstream service throttled us
    RateLimited,
    /// The upstream call failed
    Upstream,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArguments => "invalid arguments",
            Self::NotFound => "not found",
            Self::Unavailable => "unavailable",
            Self::RateLimited => "rate limited",
            Self::Upstream => "upstream error",
        };
        f.write_str(label)
    }
}

/// Error reported by a tool to the model
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unavailable, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Upstream, message)
    }
}

/// What a tool hands back to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Error(ToolError),
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Text the model sees for this result
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Error(err) => format!("Error ({err})"),
        }
    }
}

impl From<ToolError> for ToolOutput {
    fn from(err: ToolError) -> Self {
        Self::Error(err)
    }
}

impl From<Result<String, ToolError>> for ToolOutput {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Error(err),
        }
    }
}
