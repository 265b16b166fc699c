//! [`ToolAgent`]: an executor behind the `Agent` trait

use crate::executor::AgentExecutor;
use agent_core::{Agent, AgentOutput, Result};
use async_trait::async_trait;

/// A named, reusable handle on one backend + tool set + instructions
///
/// Holds no per-query state, so one handle serves any number of
/// concurrent `process` calls.
///
/// # Example
///
/// ```no_run
/// use agent_core::Agent;
/// use agent_runtime::{AgentExecutor, ToolAgent};
/// # use std::sync::Arc;
///
/// # async fn example(provider: Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let executor = AgentExecutor::builder()
///     .provider(provider)
///     .system_prompt("You are a web research assistant")
///     .build()?;
///
/// let agent = ToolAgent::new(executor, "Web Search Agent");
/// let output = agent.process("Latest news about artificial intelligence").await?;
/// println!("{}", output.content);
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: &str) -> Result<AgentOutput> {
        self.executor.run(input).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
