//! Tool adapters exposed to the model
//!
//! Every adapter performs one external data call and returns text. Failures
//! are returned as [`agent_tools::ToolError`] text so the model can explain
//! them instead of the run aborting.

pub mod format;
pub mod fundamentals;
pub mod news;
pub mod price;
pub mod recommendations;
pub mod web_search;

pub use fundamentals::StockFundamentalsTool;
pub use news::CompanyNewsTool;
pub use price::StockPriceTool;
pub use recommendations::AnalystRecommendationsTool;
pub use web_search::WebSearchTool;

use crate::api::{MarketDataSource, SearchProvider};
use agent_tools::Tool;
use std::sync::Arc;

/// The four market-data tools, in the order they are offered to the model
pub fn financial_tools(market: &Arc<dyn MarketDataSource>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(StockPriceTool::new(Arc::clone(market))),
        Arc::new(AnalystRecommendationsTool::new(Arc::clone(market))),
        Arc::new(StockFundamentalsTool::new(Arc::clone(market))),
        Arc::new(CompanyNewsTool::new(Arc::clone(market))),
    ]
}

/// The web search tool
pub fn web_tools(search: &Arc<dyn SearchProvider>, default_max_results: usize) -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(WebSearchTool::new(Arc::clone(search), default_max_results))]
}
