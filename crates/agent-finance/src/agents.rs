//! Agent definitions: name, role, instructions and tool set per agent kind

use crate::api::{MarketDataSource, SearchProvider};
use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use crate::tools::{financial_tools, web_tools};
use agent_llm::LLMProvider;
use agent_runtime::{AgentExecutor, ExecutorConfig, ToolAgent};
use agent_tools::ToolRegistry;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Selector naming one of the pre-built agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Financial,
    Web,
    Multi,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [Self::Financial, Self::Web, Self::Multi];

    /// Selector string accepted by the CLI and REST surfaces
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Web => "web",
            Self::Multi => "multi",
        }
    }

    pub fn definition(&self) -> &'static AgentDefinition {
        match self {
            Self::Financial => &FINANCIAL_AGENT,
            Self::Web => &WEB_SEARCH_AGENT,
            Self::Multi => &MULTI_AGENT,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "financial" => Ok(Self::Financial),
            "web" => Ok(Self::Web),
            "multi" => Ok(Self::Multi),
            _ => Err(FinanceError::InvalidSelector {
                selector: s.to_string(),
            }),
        }
    }
}

/// Which adapters an agent is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSet {
    Financial,
    Web,
    All,
}

/// Static description of an agent
#[derive(Debug)]
pub struct AgentDefinition {
    pub kind: AgentKind,
    pub name: &'static str,
    pub role: &'static str,
    pub instructions: &'static [&'static str],
    pub tools: ToolSet,
}

pub static FINANCIAL_AGENT: AgentDefinition = AgentDefinition {
    kind: AgentKind::Financial,
    name: "Financial Agent",
    role: "Fetch financial details about stocks.",
    instructions: &[
        "Always call a tool to get current data instead of answering from memory",
        "Use tables to display tabular data such as analyst recommendations and fundamentals",
        "Provide clear and structured financial information",
        "Include relevant metrics and context",
        "If a ticker symbol is invalid or not found, say so clearly and suggest checking the symbol",
    ],
    tools: ToolSet::Financial,
};

pub static WEB_SEARCH_AGENT: AgentDefinition = AgentDefinition {
    kind: AgentKind::Web,
    name: "Web Search Agent",
    role: "Search the web for information.",
    instructions: &[
        "Always include sources and URLs in your responses",
        "Format all results in Markdown",
        "Provide clear citations for all information",
    ],
    tools: ToolSet::Web,
};

pub static MULTI_AGENT: AgentDefinition = AgentDefinition {
    kind: AgentKind::Multi,
    name: "Multi-Agent System",
    role: "Answer questions that need market data, web research, or both.",
    instructions: &[
        "Decide which tools the query needs: market data tools for stock data, web_search for news and general information",
        "When a query needs both, call both kinds of tools and synthesize the results",
        "Combine and summarize insights from all sources into one well-structured response",
        "Use tables for financial data",
        "Cite sources and URLs for information from web results",
    ],
    tools: ToolSet::All,
};

impl AgentDefinition {
    /// Render the system prompt sent with every request
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are the {}. {}\n\nInstructions:\n", self.name, self.role);
        for line in self.instructions {
            prompt.push_str("- ");
            prompt.push_str(line);
            prompt.push('\n');
        }
        prompt.push_str("\nRespond in Markdown.");
        prompt
    }

    /// Instantiate this definition's tool set
    pub fn tool_registry(
        &self,
        market: &Arc<dyn MarketDataSource>,
        search: &Arc<dyn SearchProvider>,
        search_max_results: usize,
    ) -> ToolRegistry {
        let tools = match self.tools {
            ToolSet::Financial => financial_tools(market),
            ToolSet::Web => web_tools(search, search_max_results),
            ToolSet::All => {
                let mut tools = financial_tools(market);
                tools.extend(web_tools(search, search_max_results));
                tools
            }
        };

        tools
            .into_iter()
            .fold(ToolRegistry::builder(), |builder, tool| builder.register(tool))
            .build()
    }
}

/// Execution parameters shared by every agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    pub max_iterations: usize,
    pub max_tokens: usize,
    pub temperature: f32,
    pub search_max_results: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        let defaults = ExecutorConfig::default();
        Self {
            model: defaults.model,
            max_iterations: defaults.max_iterations,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature.unwrap_or(0.2),
            search_max_results: 5,
        }
    }
}

impl AgentSettings {
    pub fn from_config(config: &FinanceConfig) -> Self {
        Self {
            model: config.model().to_string(),
            max_iterations: config.max_iterations,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            search_max_results: config.search_max_results,
        }
    }
}

/// Build the handle for one agent definition
pub fn build_agent(
    definition: &AgentDefinition,
    provider: Arc<dyn LLMProvider>,
    market: &Arc<dyn MarketDataSource>,
    search: &Arc<dyn SearchProvider>,
    settings: &AgentSettings,
) -> Result<ToolAgent> {
    let registry = definition.tool_registry(market, search, settings.search_max_results);

    let executor = AgentExecutor::builder()
        .provider(provider)
        .tool_registry(Arc::new(registry))
        .model(settings.model.clone())
        .system_prompt(definition.system_prompt())
        .max_iterations(settings.max_iterations)
        .max_tokens(settings.max_tokens)
        .temperature(settings.temperature)
        .build()?;

    Ok(ToolAgent::new(executor, definition.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataSource, MockSearchProvider};

    fn sources() -> (Arc<dyn MarketDataSource>, Arc<dyn SearchProvider>) {
        (
            Arc::new(MockMarketDataSource::new()),
            Arc::new(MockSearchProvider::new()),
        )
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("financial".parse::<AgentKind>().unwrap(), AgentKind::Financial);
        assert_eq!(" WEB ".parse::<AgentKind>().unwrap(), AgentKind::Web);
        assert_eq!("Multi".parse::<AgentKind>().unwrap(), AgentKind::Multi);

        let err = "crypto".parse::<AgentKind>().unwrap_err();
        assert!(matches!(err, FinanceError::InvalidSelector { ref selector } if selector == "crypto"));
        assert!("".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_tool_sets() {
        let (market, search) = sources();

        let financial = FINANCIAL_AGENT.tool_registry(&market, &search, 5);
        assert_eq!(
            financial.names(),
            vec![
                "get_current_stock_price",
                "get_analyst_recommendations",
                "get_stock_fundamentals",
                "get_company_news",
            ]
        );

        let web = WEB_SEARCH_AGENT.tool_registry(&market, &search, 5);
        assert_eq!(web.names(), vec!["web_search"]);

        let multi = MULTI_AGENT.tool_registry(&market, &search, 5);
        assert_eq!(multi.len(), 5);
        assert!(multi.get("web_search").is_some());
        assert!(multi.get("get_current_stock_price").is_some());
    }

    #[test]
    fn test_system_prompt() {
        let prompt = WEB_SEARCH_AGENT.system_prompt();
        assert!(prompt.starts_with("You are the Web Search Agent. Search the web for information."));
        assert!(prompt.contains("- Always include sources and URLs in your responses\n"));

        for kind in AgentKind::ALL {
            assert_eq!(kind.definition().kind, kind);
            assert!(!kind.definition().system_prompt().is_empty());
        }
    }

    #[test]
    fn test_settings_from_config() {
        let config = FinanceConfig::default().with_model("llama-3.1-8b-instant");
        let settings = AgentSettings::from_config(&config);
        assert_eq!(settings.model, "llama-3.1-8b-instant");
        assert_eq!(settings.max_iterations, 8);
        assert_eq!(AgentSettings::default().model, "llama-3.3-70b-versatile");
    }
}
