//! OpenAI-compatible chat-completions provider
//!
//! Groq (`https://api.groq.com/openai/v1`) and Ollama (`{host}/v1`) both
//! implement the `/chat/completions` endpoint with function calling, so one
//! provider serves both. The presets differ only in base URL, credentials and
//! the name reported in logs.
//!
//! # Example
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, LLMProvider, Message};
//! use agent_llm::providers::{OpenAICompatConfig, OpenAICompatProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAICompatProvider::with_config(OpenAICompatConfig::groq("gsk_..."))?;
//!
//! let request = CompletionRequest::new("llama-3.3-70b-versatile", vec![Message::user("Hello!")])
//!     .with_max_tokens(100);
//!
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Groq error code for a generation whose tool calls it could not parse
const TOOL_USE_FAILED: &str = "tool_use_failed";

/// Configuration for an OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Name reported by [`LLMProvider::name`] ("groq", "ollama", ...)
    pub provider_name: String,

    /// Bearer token; empty means no Authorization header is sent
    pub api_key: String,

    /// Base URL up to and including the `/v1` segment
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAICompatConfig {
    /// Create a config for an arbitrary compatible endpoint
    pub fn new(
        provider_name: impl Into<String>,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Groq cloud preset
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", api_key, GROQ_API_BASE)
    }

    /// Local Ollama preset; `host` is the server root, e.g. `http://localhost:11434`
    pub fn ollama(host: impl AsRef<str>) -> Self {
        let host = host.as_ref().trim_end_matches('/');
        Self::new("ollama", String::new(), format!("{host}/v1"))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Provider for any backend speaking the OpenAI chat-completions protocol
pub struct OpenAICompatProvider {
    client: Client,
    config: OpenAICompatConfig,
}

impl OpenAICompatProvider {
    /// Create a provider from a configuration
    pub fn with_config(config: OpenAICompatConfig) -> Result<Self> {
        if config.api_base.is_empty() {
            return Err(LLMError::ConfigurationError(format!(
                "{}: API base URL is empty",
                config.provider_name
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAICompatConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> LLMError {
        if err.is_timeout() {
            LLMError::Timeout(format!(
                "{} did not answer within {}s",
                self.config.provider_name, self.config.timeout_secs
            ))
        } else if err.is_connect() {
            LLMError::Unreachable(format!(
                "cannot connect to {} at {}: {err}",
                self.config.provider_name, self.config.api_base
            ))
        } else {
            LLMError::HttpError(err)
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    #[instrument(skip(self, request), fields(provider = %self.config.provider_name, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending chat completion to {}", self.config.api_base);

        let wire_request = ChatRequest {
            model: request.model.clone(),
            messages: build_chat_messages(request.system.clone(), request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: (!request.tools.is_empty()).then(|| convert_tools(&request.tools)),
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .json(&wire_request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            return Err(map_error_status(status, &body, &request.model));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = chat_response.usage.unwrap_or_default();
        debug!(
            finish_reason = ?choice.finish_reason,
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            "Received response"
        );

        let message = parse_response_message(choice.message)?;
        let mut stop_reason = map_stop_reason(choice.finish_reason.as_deref());
        // Ollama reports "stop" even when the message carries tool calls
        if message.has_tool_uses() {
            stop_reason = StopReason::ToolUse;
        }

        Ok(CompletionResponse {
            message,
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }
}

/// Translate a non-2xx status and its body into an [`LLMError`]
fn map_error_status(status: u16, body: &str, model: &str) -> LLMError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.to_string());
    let code = detail.as_ref().and_then(|d| d.code.as_deref());

    if code == Some(TOOL_USE_FAILED) {
        warn!(status, "Backend rejected the generated tool calls");
        return LLMError::ToolCallRejected(message);
    }

    match status {
        401 | 403 => LLMError::AuthenticationFailed,
        429 => LLMError::RateLimitExceeded(message),
        404 => LLMError::ModelNotFound(model.to_string()),
        400 | 422 => {
            if code == Some("model_not_found") || code == Some("model_decommissioned") {
                LLMError::ModelNotFound(model.to_string())
            } else {
                LLMError::InvalidRequest(message)
            }
        }
        _ => LLMError::RequestFailed(format!("HTTP {status}: {message}")),
    }
}

// ============================================================================
// Wire request types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

// ============================================================================
// Wire response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ChatResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ChatResponseFunctionCall {
    name: String,
    /// JSON-encoded string per the protocol; Ollama sometimes sends an object
    arguments: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build the wire message list; the system prompt goes first
fn build_chat_messages(system: Option<String>, messages: Vec<Message>) -> Vec<ChatMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);

    if let Some(sys) = system {
        result.push(ChatMessage::text("system", sys));
    }

    for msg in messages {
        result.extend(convert_message(msg));
    }

    result
}

/// Convert a single message; tool results each become their own "tool" message
fn convert_message(msg: Message) -> Vec<ChatMessage> {
    let role = msg.role.as_str();

    match msg.content {
        Some(MessageContent::Text(text)) => vec![ChatMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => convert_blocks(role, blocks),
        None => vec![ChatMessage::text(role, String::new())],
    }
}

fn convert_blocks(role: &'static str, blocks: Vec<ContentBlock>) -> Vec<ChatMessage> {
    let mut tool_messages = Vec::new();
    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ChatToolCall {
                    id,
                    tool_type: "function",
                    function: ChatFunctionCall {
                        name,
                        arguments: input.to_string(),
                    },
                });
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_messages.push(ChatMessage {
                role: "tool",
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    let mut messages = Vec::with_capacity(tool_messages.len() + 1);
    if !texts.is_empty() || !tool_calls.is_empty() {
        messages.push(ChatMessage {
            role,
            content: if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            },
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        });
    }
    messages.extend(tool_messages);
    messages
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<ChatTool> {
    tools
        .iter()
        .map(|tool| ChatTool {
            tool_type: "function",
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_response_message(msg: ChatResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for (index, call) in msg.tool_calls.unwrap_or_default().into_iter().enumerate() {
        let input = match call.function.arguments {
            serde_json::Value::String(raw) if raw.trim().is_empty() => serde_json::json!({}),
            serde_json::Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                LLMError::UnexpectedResponse(format!(
                    "Failed to parse arguments for tool '{}': {e}",
                    call.function.name
                ))
            })?,
            other => other,
        };

        blocks.push(ContentBlock::ToolUse {
            id: call.id.unwrap_or_else(|| format!("call_{index}")),
            name: call.function.name,
            input,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message::assistant_blocks(blocks))
}

fn map_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("stop") | None => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls") => StopReason::ToolUse,
        Some(other) => {
            debug!("Unknown finish reason: {}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use serde_json::json;

    #[test]
    fn test_groq_preset() {
        let provider = OpenAICompatProvider::with_config(OpenAICompatConfig::groq("gsk_test"))
            .unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.config().api_base, GROQ_API_BASE);
        assert_eq!(provider.config().timeout_secs, 120);
    }

    #[test]
    fn test_ollama_preset_appends_v1() {
        let config = OpenAICompatConfig::ollama("http://gpu-box:11434/").with_timeout(30);
        assert_eq!(config.api_base, "http://gpu-box:11434/v1");
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_empty_base_is_configuration_error() {
        let config = OpenAICompatConfig::new("custom", "", "");
        let result = OpenAICompatProvider::with_config(config);
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_system_message_first() {
        let messages = build_chat_messages(
            Some("You are a financial analyst".to_string()),
            vec![Message::user("Price of AAPL?")],
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content.as_deref(), Some("Price of AAPL?"));
    }

    #[test]
    fn test_assistant_tool_use_conversion() {
        let msg = Message::assistant_blocks(vec![ContentBlock::ToolUse {
            id: "call_1".to_string(),
            name: "get_current_stock_price".to_string(),
            input: json!({"symbol": "AAPL"}),
        }]);

        let converted = convert_message(msg);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "assistant");
        assert!(converted[0].content.is_none());
        let calls = converted[0].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "get_current_stock_price");
        assert_eq!(calls[0].function.arguments, r#"{"symbol":"AAPL"}"#);
    }

    #[test]
    fn test_tool_results_become_tool_messages() {
        let msg = Message {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::ToolResult {
                    tool_use_id: "call_1".to_string(),
                    content: "result 1".to_string(),
                    is_error: false,
                },
                ContentBlock::ToolResult {
                    tool_use_id: "call_2".to_string(),
                    content: "result 2".to_string(),
                    is_error: true,
                },
            ])),
        };

        let converted = convert_message(msg);
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|m| m.role == "tool"));
        assert_eq!(converted[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(converted[1].tool_call_id.as_deref(), Some("call_2"));
    }

    #[test]
    fn test_tool_definition_conversion() {
        let tool = ToolDefinition::new(
            "web_search",
            "Search the web",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        );

        let converted = convert_tools(&[tool]);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].tool_type, "function");
        assert_eq!(converted[0].function.name, "web_search");
    }

    #[test]
    fn test_parse_response_with_string_arguments() {
        let raw: ChatResponseMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {"name": "web_search", "arguments": "{\"query\":\"AI news\"}"}
            }]
        }))
        .unwrap();

        let message = parse_response_message(raw).unwrap();
        let uses = message.tool_uses();
        assert_eq!(uses.len(), 1);
        match uses[0] {
            ContentBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "call_abc");
                assert_eq!(name, "web_search");
                assert_eq!(input["query"], "AI news");
            }
            other => panic!("Expected tool use, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_with_object_arguments_and_no_id() {
        let raw: ChatResponseMessage = serde_json::from_value(json!({
            "content": "",
            "tool_calls": [{
                "function": {"name": "get_company_news", "arguments": {"symbol": "NVDA"}}
            }]
        }))
        .unwrap();

        let message = parse_response_message(raw).unwrap();
        match message.tool_uses()[0] {
            ContentBlock::ToolUse { id, input, .. } => {
                assert_eq!(id, "call_0");
                assert_eq!(input["symbol"], "NVDA");
            }
            other => panic!("Expected tool use, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_rejects_malformed_arguments() {
        let raw: ChatResponseMessage = serde_json::from_value(json!({
            "tool_calls": [{
                "id": "call_1",
                "function": {"name": "web_search", "arguments": "{not json"}
            }]
        }))
        .unwrap();

        assert!(matches!(
            parse_response_message(raw),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason(Some("stop")), StopReason::EndTurn);
        assert_eq!(map_stop_reason(Some("length")), StopReason::MaxTokens);
        assert_eq!(map_stop_reason(Some("tool_calls")), StopReason::ToolUse);
        assert_eq!(map_stop_reason(None), StopReason::EndTurn);
        assert_eq!(map_stop_reason(Some("content_filter")), StopReason::EndTurn);
    }

    #[test]
    fn test_groq_tool_use_failed_maps_to_rejection() {
        let body = r#"{"error":{"message":"Failed to call a function. Please adjust your prompt. See 'failed_generation' for more details.","type":"invalid_request_error","code":"tool_use_failed","failed_generation":"<function=get_company_news>"}}"#;
        let err = map_error_status(400, body, "llama-3.3-70b-versatile");
        match err {
            LLMError::ToolCallRejected(msg) => assert!(msg.starts_with("Failed to call a function")),
            other => panic!("Expected ToolCallRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        assert!(matches!(
            map_error_status(401, "{}", "m"),
            LLMError::AuthenticationFailed
        ));
        assert!(matches!(
            map_error_status(429, r#"{"error":{"message":"slow down"}}"#, "m"),
            LLMError::RateLimitExceeded(msg) if msg == "slow down"
        ));
        assert!(matches!(
            map_error_status(404, r#"{"error":{"message":"model \"llama3.1\" not found"}}"#, "llama3.1"),
            LLMError::ModelNotFound(model) if model == "llama3.1"
        ));
        assert!(matches!(
            map_error_status(400, r#"{"error":{"message":"bad","code":"model_not_found"}}"#, "x"),
            LLMError::ModelNotFound(_)
        ));
        assert!(matches!(
            map_error_status(400, "plain text", "m"),
            LLMError::InvalidRequest(msg) if msg == "plain text"
        ));
        assert!(matches!(
            map_error_status(503, "overloaded", "m"),
            LLMError::RequestFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_classified() {
        // Port 9 (discard) on localhost is closed on any sane test machine
        let config = OpenAICompatConfig::ollama("http://127.0.0.1:9").with_timeout(5);
        let provider = OpenAICompatProvider::with_config(config).unwrap();
        let request = CompletionRequest::new("llama3.1", vec![Message::user("hi")]);

        let err = provider.complete(request).await.unwrap_err();
        assert!(
            matches!(err, LLMError::Unreachable(_) | LLMError::Timeout(_)),
            "unexpected error: {err:?}"
        );
    }
}
