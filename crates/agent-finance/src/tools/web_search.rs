//! Tool for general web search

use super::format::parse_params;
use crate::api::SearchProvider;
use crate::config::MAX_SEARCH_RESULTS;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

/// Web search returning a numbered list of titles, snippets and source URLs
pub struct WebSearchTool {
    search: Arc<dyn SearchProvider>,
    default_max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchProvider>, default_max_results: usize) -> Self {
        Self {
            search,
            default_max_results: default_max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }

    async fn fetch(&self, params: Value) -> Result<String, ToolError> {
        let params: SearchParams = parse_params(params)?;
        let query = params.query.trim();
        if query.is_empty() {
            return Err(ToolError::invalid_arguments("query must not be empty"));
        }
        let max_results = params
            .max_results
            .unwrap_or(self.default_max_results)
            .clamp(1, MAX_SEARCH_RESULTS);

        debug!(provider = self.search.name(), max_results = max_results, "Running web search");
        let hits = self.search.search(query, max_results).await?;
        if hits.is_empty() {
            return Ok(format!("No results found for: {query}"));
        }

        let mut out = format!("Search results for: {query}\n");
        for (i, hit) in hits.iter().take(max_results).enumerate() {
            let _ = write!(out, "\n{}. **{}**\n", i + 1, hit.title);
            if !hit.snippet.is_empty() {
                let _ = writeln!(out, "   {}", hit.snippet);
            }
            let _ = writeln!(out, "   Source: {}", hit.url);
        }
        Ok(out)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> ToolOutput {
        self.fetch(params).await.into()
    }

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information and news. Returns titles, snippets and \
         source URLs."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "query": schema::string("Search query"),
                "max_results": schema::bounded_integer("Maximum number of results (default 5)", 1, 10),
            }),
            &["query"],
        )
    }
}
