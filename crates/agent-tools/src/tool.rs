//! The `Tool` trait

use crate::ToolOutput;
use agent_llm::ToolDefinition;
use async_trait::async_trait;
use serde_json::Value;

/// A named capability the model can invoke during a run
///
/// Implementations never fail the run: every problem, from bad arguments to
/// an upstream outage, comes back as [`ToolOutput::Error`] text that the
/// model reads on its next turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// `params` is whatever the model produced and may not match the schema
    async fn execute(&self, params: Value) -> ToolOutput;

    /// Unique within a registry
    fn name(&self) -> &str;

    /// Shown to the model to decide when the tool applies
    fn description(&self) -> &str;

    /// JSON Schema of `params`
    fn input_schema(&self) -> Value;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}
