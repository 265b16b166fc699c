//! Web search providers: Tavily (keyed) and DuckDuckGo HTML (keyless fallback)

use crate::config::FinanceConfig;
use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const TAVILY_API_URL: &str = "https://api.tavily.com/search";
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; fin-agent/0.1)";

/// One web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A web search backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search, returning at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> DataResult<Vec<SearchHit>>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

/// Tavily when a key is configured, DuckDuckGo otherwise
pub fn search_provider(config: &FinanceConfig) -> DataResult<Arc<dyn SearchProvider>> {
    let provider: Arc<dyn SearchProvider> = match config.tavily_api_key.as_deref() {
        Some(key) => Arc::new(TavilyClient::new(key, config.data_timeout)?),
        None => Arc::new(DuckDuckGoClient::new(config.data_timeout)?),
    };
    info!(provider = provider.name(), "Web search provider selected");
    Ok(provider)
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily search API client
pub struct TavilyClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> DataResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            endpoint: TAVILY_API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> DataResult<Vec<SearchHit>> {
        let request = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            include_answer: false,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited("Tavily".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::api(
                "Tavily",
                format!("{status}: {}", agent_utils::preview(&body, 200)),
            ));
        }

        let parsed: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| DataError::parse("Tavily", e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "tavily"
    }
}

/// DuckDuckGo HTML endpoint client
///
/// Needs no key but may answer with a bot-check page, which is reported as
/// [`DataError::Blocked`].
pub struct DuckDuckGoClient {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoClient {
    pub fn new(timeout: Duration) -> DataResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()?,
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> DataResult<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::api("DuckDuckGo", status.to_string()));
        }

        let html = response.text().await?;
        if is_bot_check(&html) {
            return Err(DataError::Blocked("DuckDuckGo".to_string()));
        }

        let hits = parse_duckduckgo_html(&html, max_results);
        debug!(hits = hits.len(), "Parsed DuckDuckGo results");
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("static regex")
});

static RESULT_LINK_HREF_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*href="([^"]*)"[^>]*class="result__a"[^>]*>(.*?)</a>"#)
        .expect("static regex")
});

static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</a>"#).expect("static regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

fn is_bot_check(html: &str) -> bool {
    html.contains("anomaly-modal") || html.contains("Unfortunately, bots")
}

/// Extract results from a DuckDuckGo HTML page
fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<SearchHit> {
    html.split("result__body")
        .skip(1)
        .filter_map(|chunk| {
            let captures = RESULT_LINK
                .captures(chunk)
                .or_else(|| RESULT_LINK_HREF_FIRST.captures(chunk))?;
            let title = clean_text(&captures[2]);
            if title.is_empty() {
                return None;
            }
            let url = resolve_result_url(&decode_entities(&captures[1]));
            let snippet = RESULT_SNIPPET
                .captures(chunk)
                .map(|c| clean_text(&c[1]))
                .unwrap_or_default();

            Some(SearchHit { title, url, snippet })
        })
        .take(max_results)
        .collect()
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    decode_entities(stripped.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
