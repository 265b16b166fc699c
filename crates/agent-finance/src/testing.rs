//! Scripted backend and static data sources for tests
//!
//! Available to this crate's tests and, through the `test-support` feature,
//! to the surface crates.

use crate::api::{
    Fundamentals, MarketDataSource, NewsArticle, PriceSnapshot, RecommendationTrend, SearchHit,
    SearchProvider,
};
use crate::error::{DataError, DataResult};
use agent_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Placeholder in [`ScriptStep::Answer`] replaced by the latest tool results
pub const TOOL_RESULTS: &str = "{tool_results}";

/// One scripted backend reply
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Ask for a single tool call
    ToolCall { name: String, input: Value },
    /// Finish with this text; `{tool_results}` expands to the tool output fed back last
    Answer(String),
    /// Fail the way Groq does for a generation with unparseable tool calls
    Reject(String),
    /// Fail as if the backend could not be reached
    Unreachable(String),
}

impl ScriptStep {
    pub fn tool_call(name: impl Into<String>, input: Value) -> Self {
        Self::ToolCall {
            name: name.into(),
            input,
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer(text.into())
    }
}

/// Backend that replays a fixed script, wrapping around at the end
pub struct ScriptedProvider {
    steps: Vec<ScriptStep>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of every request received
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn latest_tool_results(request: &CompletionRequest) -> String {
    request
        .messages
        .last()
        .map(|message| {
            message
                .tool_results()
                .into_iter()
                .map(|(_, content, _)| content.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let tool_results = latest_tool_results(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let Some(step) = self.steps.get(n % self.steps.len().max(1)) else {
            return Err(LLMError::UnexpectedResponse("empty script".to_string()));
        };

        match step {
            ScriptStep::ToolCall { name, input } => Ok(CompletionResponse {
                message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                    id: format!("call_{n}"),
                    name: name.clone(),
                    input: input.clone(),
                }]),
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
            }),
            ScriptStep::Answer(template) => Ok(CompletionResponse {
                message: Message::assistant(template.replace(TOOL_RESULTS, &tool_results)),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }),
            ScriptStep::Reject(message) => Err(LLMError::ToolCallRejected(message.clone())),
            ScriptStep::Unreachable(message) => Err(LLMError::Unreachable(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// In-memory market data keyed by symbol; anything absent is an unknown ticker
#[derive(Default)]
pub struct StaticMarketData {
    prices: HashMap<String, PriceSnapshot>,
    recommendations: HashMap<String, Vec<RecommendationTrend>>,
    fundamentals: HashMap<String, Fundamentals>,
    news: HashMap<String, Vec<NewsArticle>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, snapshot: PriceSnapshot) -> Self {
        self.prices.insert(snapshot.symbol.clone(), snapshot);
        self
    }

    pub fn with_recommendations(mut self, symbol: &str, trends: Vec<RecommendationTrend>) -> Self {
        self.recommendations.insert(symbol.to_string(), trends);
        self
    }

    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals
            .insert(fundamentals.symbol.clone(), fundamentals);
        self
    }

    pub fn with_news(mut self, symbol: &str, articles: Vec<NewsArticle>) -> Self {
        self.news.insert(symbol.to_string(), articles);
        self
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, symbol: &str) -> DataResult<T> {
    map.get(symbol)
        .cloned()
        .ok_or_else(|| DataError::TickerNotFound(symbol.to_string()))
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn latest_price(&self, symbol: &str) -> DataResult<PriceSnapshot> {
        lookup(&self.prices, symbol)
    }

    async fn recommendations(&self, symbol: &str) -> DataResult<Vec<RecommendationTrend>> {
        lookup(&self.recommendations, symbol)
    }

    async fn fundamentals(&self, symbol: &str) -> DataResult<Fundamentals> {
        lookup(&self.fundamentals, symbol)
    }

    async fn company_news(&self, symbol: &str, limit: usize) -> DataResult<Vec<NewsArticle>> {
        let mut articles = lookup(&self.news, symbol)?;
        articles.truncate(limit);
        Ok(articles)
    }
}

/// Search provider returning the same hits for every query
#[derive(Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str, max_results: usize) -> DataResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
