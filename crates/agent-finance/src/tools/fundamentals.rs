//! Tool for company profile and valuation metrics

use super::format::{format_market_cap, interpret_pe, markdown_table, normalize_symbol, or_na, parse_params};
use crate::api::{Fundamentals, MarketDataSource};
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Company profile plus key metrics as a Markdown table
pub struct StockFundamentalsTool {
    market: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct FundamentalsParams {
    symbol: String,
}

impl StockFundamentalsTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn fetch(&self, params: Value) -> Result<String, ToolError> {
        let params: FundamentalsParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let data = self.market.fundamentals(&symbol).await?;
        Ok(render(&data))
    }
}

fn text_or_na(value: Option<&String>) -> String {
    value.map_or_else(|| "N/A".to_string(), Clone::clone)
}

fn render(data: &Fundamentals) -> String {
    let profile = &data.profile;
    let metrics = &data.metrics;

    let market_cap = profile
        .market_capitalization
        // reported in millions
        .map_or_else(|| "N/A".to_string(), |m| format_market_cap(m * 1_000_000.0));
    let pe = metrics.pe_ratio.map_or_else(
        || "N/A".to_string(),
        |pe| format!("{pe:.2} ({})", interpret_pe(pe)),
    );
    let dividend = metrics
        .dividend_yield
        .map_or_else(|| "N/A".to_string(), |y| format!("{y:.2}%"));

    let rows = [
        ("Company", text_or_na(profile.name.as_ref())),
        ("Industry", text_or_na(profile.industry.as_ref())),
        ("Exchange", text_or_na(profile.exchange.as_ref())),
        ("Country", text_or_na(profile.country.as_ref())),
        ("Market Cap", market_cap),
        ("P/E Ratio", pe),
        ("EPS", or_na(metrics.eps)),
        ("Dividend Yield", dividend),
        ("Beta", or_na(metrics.beta)),
        ("52-Week High", or_na(metrics.week_52_high)),
        ("52-Week Low", or_na(metrics.week_52_low)),
    ];

    format!(
        "Fundamentals for {}\n\n{}",
        data.symbol,
        markdown_table(
            &["Metric", "Value"],
            rows.into_iter().map(|(k, v)| vec![k.to_string(), v]),
        )
    )
}

#[async_trait]
impl Tool for StockFundamentalsTool {
    async fn execute(&self, params: Value) -> ToolOutput {
        self.fetch(params).await.into()
    }

    fn name(&self) -> &str {
        "get_stock_fundamentals"
    }

    fn description(&self) -> &str {
        "Get company fundamentals for a stock: profile, market cap, P/E ratio, EPS, \
         dividend yield, beta and 52-week range."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol, e.g. MSFT"),
            }),
            &["symbol"],
        )
    }
}
