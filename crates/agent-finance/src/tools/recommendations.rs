//! Tool for analyst recommendation trends

use super::format::{markdown_table, normalize_symbol, parse_params};
use crate::api::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Most recent periods shown in the table
const MAX_PERIODS: usize = 4;

/// Analyst recommendation counts per period
pub struct AnalystRecommendationsTool {
    market: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    symbol: String,
}

impl AnalystRecommendationsTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn fetch(&self, params: Value) -> Result<String, ToolError> {
        let params: RecommendationParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let trends = self.market.recommendations(&symbol).await?;

        let Some(latest) = trends.first() else {
            return Ok(format!("No analyst recommendations available for {symbol}."));
        };

        let rows = trends.iter().take(MAX_PERIODS).map(|t| {
            vec![
                t.period.clone(),
                t.strong_buy.to_string(),
                t.buy.to_string(),
                t.hold.to_string(),
                t.sell.to_string(),
                t.strong_sell.to_string(),
                t.total().to_string(),
            ]
        });

        Ok(format!(
            "Analyst recommendations for {symbol} (latest consensus: {} from {} analysts)\n\n{}",
            latest.consensus(),
            latest.total(),
            markdown_table(
                &["Period", "Strong Buy", "Buy", "Hold", "Sell", "Strong Sell", "Total"],
                rows,
            ),
        ))
    }
}

#[async_trait]
impl Tool for AnalystRecommendationsTool {
    async fn execute(&self, params: Value) -> ToolOutput {
        self.fetch(params).await.into()
    }

    fn name(&self) -> &str {
        "get_analyst_recommendations"
    }

    fn description(&self) -> &str {
        "Get analyst recommendations (strong buy, buy, hold, sell, strong sell counts) \
         for a stock over recent months."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol, e.g. NVDA"),
            }),
            &["symbol"],
        )
    }
}
