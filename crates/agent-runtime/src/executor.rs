//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call LLM with conversation history and available tools
//! 2. Check stop reason
//! 3. If tool use requested, execute tools and loop back
//! 4. If completed, return final response
//!
//! The executor never chooses tools itself. Which tools run, and in what
//! order, is entirely the backend's decision.

use agent_core::{AgentOutput, BackendFailureKind, Result, ToolCallRecord};
use agent_llm::{CompletionRequest, ContentBlock, LLMProvider, Message, StopReason};
use agent_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of backend round-trips per run
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            model: "llama-3.3-70b-versatile".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.2),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
///
/// Holds only shared, read-only state, so a single executor can serve any
/// number of concurrent runs.
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Create a new builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Tools offered to the backend
    pub fn tools(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Name of the backend provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Execute the agent loop for a single user query
    ///
    /// Returns the backend's final text together with every tool call made.
    /// Backend failures end the run immediately; tool failures are handed
    /// back to the backend as error results.
    pub async fn run(&self, user_message: &str) -> Result<AgentOutput> {
        let mut conversation = vec![Message::user(user_message)];
        let mut tool_calls = Vec::new();
        let tools = self.tool_registry.definitions();
        let system = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration = iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            let request = CompletionRequest::new(&self.config.model, conversation.clone())
                .with_system(system.clone())
                .with_max_tokens(self.config.max_tokens)
                .with_temperature(self.config.temperature)
                .with_tools(tools.clone());

            debug!(
                model = %self.config.model,
                tool_count = tools.len(),
                "Sending request to LLM"
            );
            let response = self.provider.complete(request).await?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            match response.stop_reason {
                StopReason::ToolUse if response.message.has_tool_uses() => {
                    let results = self
                        .execute_tools(&response.message, &mut tool_calls)
                        .await;
                    conversation.push(response.message);
                    conversation.extend(results);
                }
                StopReason::ToolUse => {
                    return Err(agent_core::Error::backend(
                        BackendFailureKind::UnexpectedResponse,
                        "backend reported tool use without any tool calls",
                    ));
                }
                StopReason::EndTurn => {
                    let content = response.message.text().unwrap_or_default();
                    info!(
                        iteration = iteration,
                        response_length = content.len(),
                        tool_calls = tool_calls.len(),
                        "Agent completed"
                    );
                    return Ok(AgentOutput {
                        content,
                        tool_calls,
                        iterations: iteration,
                    });
                }
                StopReason::MaxTokens => {
                    warn!(max_tokens = self.config.max_tokens, "Hit max tokens in LLM response");
                    return match response.message.text() {
                        Some(content) => Ok(AgentOutput {
                            content,
                            tool_calls,
                            iterations: iteration,
                        }),
                        None => Err(agent_core::Error::backend(
                            BackendFailureKind::Incomplete,
                            format!(
                                "response truncated at {} tokens before any text was produced",
                                self.config.max_tokens
                            ),
                        )),
                    };
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            tool_calls = tool_calls.len(),
            "Max iterations reached without a final answer"
        );
        Err(agent_core::Error::backend(
            BackendFailureKind::Incomplete,
            format!(
                "no final answer after {} backend round-trips",
                self.config.max_iterations
            ),
        ))
    }

    /// Execute tool calls from an assistant message, in the order requested
    async fn execute_tools(
        &self,
        message: &Message,
        records: &mut Vec<ToolCallRecord>,
    ) -> Vec<Message> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let Some(tool) = self.tool_registry.get(name) else {
                warn!(tool_name = %name, "Backend requested an unknown tool");
                records.push(ToolCallRecord {
                    name: name.clone(),
                    arguments: input.clone(),
                    is_error: true,
                    duration_ms: 0,
                });
                results.push(Message::tool_result(
                    id.clone(),
                    format!(
                        "Error (invalid arguments: unknown tool '{name}'; available tools: {})",
                        self.tool_registry.names().join(", ")
                    ),
                    true,
                ));
                continue;
            };

            info!(tool_name = %name, tool_id = %id, "Executing tool");
            let start = Instant::now();
            let output = tool.execute(input.clone()).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            let rendered = output.render();

            if output.is_error() {
                warn!(
                    tool_name = %name,
                    duration_ms = duration_ms,
                    error = %rendered,
                    "Tool reported an error"
                );
                results.push(Message::tool_result(id.clone(), rendered, true));
            } else {
                info!(
                    tool_name = %name,
                    duration_ms = duration_ms,
                    result_length = rendered.len(),
                    "Tool execution succeeded"
                );
                results.push(Message::tool_result(id.clone(), rendered, false));
            }

            records.push(ToolCallRecord {
                name: name.clone(),
                arguments: input.clone(),
                is_error: output.is_error(),
                duration_ms,
            });
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        if self.config.max_iterations == 0 {
            return Err(agent_core::Error::InitializationFailed(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
