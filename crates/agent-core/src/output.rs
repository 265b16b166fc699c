//! Result of a single agent run

use serde::{Deserialize, Serialize};

/// One tool invocation made while answering a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name as the model requested it
    pub name: String,
    /// Arguments the model supplied
    pub arguments: serde_json::Value,
    /// Whether the tool reported a failure back to the model
    pub is_error: bool,
    /// Wall-clock time spent in the tool
    pub duration_ms: u64,
}

/// Final answer plus the tool calls that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model round-trips used
    pub iterations: usize,
}

impl AgentOutput {
    /// Output with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            iterations: 1,
        }
    }

    /// Names of the tools invoked, in call order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|c| c.name.as_str()).collect()
    }
}
