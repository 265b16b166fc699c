//! The `Agent` trait

use crate::{AgentOutput, Result};
use async_trait::async_trait;

/// An agent takes a single user query and produces a final answer together
/// with the record of the tool invocations it made on the way. Agents hold no
/// conversation state between calls, so one instance can serve concurrent
/// queries.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process one query and return the final answer
    async fn process(&self, input: &str) -> Result<AgentOutput>;

    /// Display name, e.g. "Financial Agent"
    fn name(&self) -> &str;
}
