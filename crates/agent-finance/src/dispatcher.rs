//! Query dispatcher: resolves an agent selector and forwards the query

use crate::agents::{AgentKind, AgentSettings, build_agent};
use crate::api::{MarketDataClient, MarketDataSource, SearchProvider, search_provider};
use crate::backend::build_provider;
use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use agent_core::{Agent, ToolCallRecord};
use agent_llm::LLMProvider;
use agent_runtime::ToolAgent;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Successful answer to one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub agent: AgentKind,
    /// Final text from the backend, unchanged
    #[serde(rename = "response")]
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub elapsed_ms: u64,
}

/// Public description of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub id: AgentKind,
    pub name: String,
    pub role: String,
    pub tools: Vec<String>,
}

/// Owns one handle per agent kind, built once and reused for every query
///
/// Handles hold no per-query state, so a single dispatcher can be shared
/// across tasks behind an `Arc`.
pub struct QueryDispatcher {
    financial: ToolAgent,
    web: ToolAgent,
    multi: ToolAgent,
    backend: String,
    model: String,
}

impl QueryDispatcher {
    pub fn builder() -> QueryDispatcherBuilder {
        QueryDispatcherBuilder::default()
    }

    /// Validate the configuration and build the backend, data clients and handles
    pub fn from_config(config: &FinanceConfig) -> Result<Self> {
        config.validate()?;

        let provider = build_provider(config)?;
        let market = MarketDataClient::from_config(config)
            .map_err(|e| FinanceError::Configuration(format!("market data client: {e}")))?;
        let search = search_provider(config)
            .map_err(|e| FinanceError::Configuration(format!("search client: {e}")))?;

        Self::builder()
            .provider(provider)
            .market_data(Arc::new(market))
            .search(search)
            .settings(AgentSettings::from_config(config))
            .build()
    }

    /// Run a query against the agent named by `agent`
    pub async fn run(&self, query: &str, agent: &str) -> Result<AgentResponse> {
        let kind: AgentKind = agent.parse()?;
        self.run_kind(query, kind).await
    }

    /// Run a query against an already-resolved agent kind
    ///
    /// Makes exactly one agent run; backend failures are returned with the
    /// backend's message and never retried.
    pub async fn run_kind(&self, query: &str, kind: AgentKind) -> Result<AgentResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FinanceError::EmptyQuery);
        }

        info!(
            agent = %kind,
            query = %agent_utils::preview(query, 120),
            "Dispatching query"
        );
        let start = Instant::now();

        match self.handle(kind).process(query).await {
            Ok(output) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                info!(
                    agent = %kind,
                    elapsed_ms = elapsed_ms,
                    tool_calls = output.tool_calls.len(),
                    iterations = output.iterations,
                    "Query completed"
                );
                Ok(AgentResponse {
                    agent: kind,
                    content: output.content,
                    tool_calls: output.tool_calls,
                    elapsed_ms,
                })
            }
            Err(err) => {
                let err = FinanceError::from(err);
                warn!(
                    agent = %kind,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error_type = err.error_type(),
                    error = %agent_utils::redact(&err.to_string()),
                    "Query failed"
                );
                Err(err)
            }
        }
    }

    pub fn handle(&self, kind: AgentKind) -> &ToolAgent {
        match kind {
            AgentKind::Financial => &self.financial,
            AgentKind::Web => &self.web,
            AgentKind::Multi => &self.multi,
        }
    }

    /// Name of the LLM backend serving all agents
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Descriptions of all agents in selector order
    pub fn agents(&self) -> Vec<AgentInfo> {
        AgentKind::ALL
            .into_iter()
            .map(|kind| {
                let definition = kind.definition();
                AgentInfo {
                    id: kind,
                    name: definition.name.to_string(),
                    role: definition.role.to_string(),
                    tools: self
                        .handle(kind)
                        .executor()
                        .tools()
                        .names()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                }
            })
            .collect()
    }
}

/// Builder for QueryDispatcher with injectable backend and data sources
#[derive(Default)]
pub struct QueryDispatcherBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    market: Option<Arc<dyn MarketDataSource>>,
    search: Option<Arc<dyn SearchProvider>>,
    settings: AgentSettings,
}

impl QueryDispatcherBuilder {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn market_data(mut self, market: Arc<dyn MarketDataSource>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build all three agent handles
    pub fn build(self) -> Result<QueryDispatcher> {
        let missing = |what: &str| FinanceError::Configuration(format!("{what} not set"));
        let provider = self.provider.ok_or_else(|| missing("LLM provider"))?;
        let market = self.market.ok_or_else(|| missing("market data source"))?;
        let search = self.search.ok_or_else(|| missing("search provider"))?;

        let build = |kind: AgentKind| {
            build_agent(
                kind.definition(),
                Arc::clone(&provider),
                &market,
                &search,
                &self.settings,
            )
        };

        Ok(QueryDispatcher {
            financial: build(AgentKind::Financial)?,
            web: build(AgentKind::Web)?,
            multi: build(AgentKind::Multi)?,
            backend: provider.name().to_string(),
            model: self.settings.model.clone(),
        })
    }
}
