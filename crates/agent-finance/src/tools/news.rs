//! Tool for recent company news

use super::format::{normalize_symbol, parse_params};
use crate::api::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write;
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 10;

/// Latest headlines for a company from the past week
pub struct CompanyNewsTool {
    market: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    symbol: String,
    #[serde(default)]
    limit: Option<usize>,
}

impl CompanyNewsTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn fetch(&self, params: Value) -> Result<String, ToolError> {
        let params: NewsParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let articles = self.market.company_news(&symbol, limit).await?;
        if articles.is_empty() {
            return Ok(format!("No recent news found for {symbol}."));
        }

        let mut out = format!("Latest news for {symbol}:\n");
        for (i, article) in articles.iter().take(limit).enumerate() {
            let _ = write!(
                out,
                "\n{}. **{}** ({}, {})\n",
                i + 1,
                article.headline,
                article.source,
                article.published.format("%Y-%m-%d"),
            );
            if !article.summary.is_empty() {
                let _ = writeln!(out, "   {}", article.summary);
            }
            let _ = writeln!(out, "   URL: {}", article.url);
        }
        Ok(out)
    }
}

#[async_trait]
impl Tool for CompanyNewsTool {
    async fn execute(&self, params: Value) -> ToolOutput {
        self.fetch(params).await.into()
    }

    fn name(&self) -> &str {
        "get_company_news"
    }

    fn description(&self) -> &str {
        "Get the latest news headlines for a company from the past week, with source, \
         date, summary and URL."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol, e.g. TSLA"),
                "limit": schema::bounded_integer("Maximum number of articles (default 5)", 1, 10),
            }),
            &["symbol"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        FinnhubClient, MarketDataClient, MockMarketDataSource, NewsArticle, YahooQuoteClient,
    };
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article(n: u32) -> NewsArticle {
        NewsArticle {
            headline: format!("Headline {n}"),
            source: "Reuters".to_string(),
            published: Utc.with_ymd_and_hms(2026, 10, 17 - n, 12, 0, 0).unwrap(),
            url: format!("https://example.com/{n}"),
            summary: if n == 1 { String::new() } else { format!("Summary {n}") },
        }
    }

    #[tokio::test]
    async fn test_news_list() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_company_news()
            .withf(|symbol, limit| symbol == "TSLA" && *limit == 2)
            .times(1)
            .returning(|_, _| Ok(vec![article(1), article(2)]));

        let tool = CompanyNewsTool::new(Arc::new(market));
        let text = tool
            .execute(json!({"symbol": "tsla", "limit": 2}))
            .await
            .render();

        assert!(text.starts_with("Latest news for TSLA:"));
        assert!(text.contains("1. **Headline 1** (Reuters, 2026-10-16)"));
        assert!(text.contains("   Summary 2"));
        assert!(text.contains("URL: https://example.com/2"));
    }

    #[tokio::test]
    async fn test_limit_defaults_and_caps() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_company_news()
            .withf(|_, limit| *limit == 5)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        market
            .expect_company_news()
            .withf(|_, limit| *limit == 10)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let tool = CompanyNewsTool::new(Arc::new(market));
        let text = tool.execute(json!({"symbol": "AAPL"})).await.render();
        assert_eq!(text, "No recent news found for AAPL.");
        tool.execute(json!({"symbol": "AAPL", "limit": 50})).await;
    }

    async fn finnhub_backed_tool(server: &MockServer) -> CompanyNewsTool {
        let finnhub = FinnhubClient::new("fh_test_key", 600, Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        let client =
            MarketDataClient::new(YahooQuoteClient::new(Duration::from_secs(5)), Some(finnhub));
        CompanyNewsTool::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_unknown_symbol_without_news_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/company-news"))
            .and(query_param("symbol", "XYZQ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/stock/profile2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let output = finnhub_backed_tool(&server)
            .await
            .execute(json!({"symbol": "XYZQ"}))
            .await;

        assert!(output.is_error());
        assert!(output.render().contains("No data found for ticker XYZQ"));
    }

    #[tokio::test]
    async fn test_known_symbol_without_news() {
        let server = MockServer::start().await;
        Mock::given(path("/company-news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(path("/stock/profile2"))
            .and(query_param("symbol", "BRK.B"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "Berkshire Hathaway Inc", "ticker": "BRK.B"})),
            )
            .mount(&server)
            .await;

        let output = finnhub_backed_tool(&server)
            .await
            .execute(json!({"symbol": "BRK.B"}))
            .await;

        assert!(!output.is_error());
        assert_eq!(output.render(), "No recent news found for BRK.B.");
    }
}
