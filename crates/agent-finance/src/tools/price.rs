//! Tool for fetching the current stock price

use super::format::{format_count, normalize_symbol, parse_params};
use crate::api::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Latest price, day range and volume for a ticker
pub struct StockPriceTool {
    market: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct PriceParams {
    symbol: String,
}

impl StockPriceTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn fetch(&self, params: Value) -> Result<String, ToolError> {
        let params: PriceParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let quote = self.market.latest_price(&symbol).await?;

        Ok(format!(
            "{symbol} last price: {:.2} (as of {})\n\
             Open: {:.2} | High: {:.2} | Low: {:.2} | Volume: {}",
            quote.price,
            quote.timestamp.format("%Y-%m-%d %H:%M UTC"),
            quote.open,
            quote.high,
            quote.low,
            format_count(quote.volume),
        ))
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> ToolOutput {
        self.fetch(params).await.into()
    }

    fn name(&self) -> &str {
        "get_current_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price of a company by ticker symbol, with today's open, \
         high, low and volume."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol, e.g. AAPL or NVDA"),
            }),
            &["symbol"],
        )
    }
}
