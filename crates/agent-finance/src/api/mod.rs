//! API clients for market data and web search providers

pub mod finnhub;
pub mod market;
pub mod search;
pub mod yahoo;

pub use finnhub::{FINNHUB_API_BASE, FinnhubClient};
pub use market::{
    CompanyProfile, Fundamentals, KeyMetrics, MarketDataClient, MarketDataSource, NewsArticle,
    PriceSnapshot, RecommendationTrend,
};
pub use search::{DuckDuckGoClient, SearchHit, SearchProvider, TavilyClient, search_provider};
pub use yahoo::YahooQuoteClient;

#[cfg(test)]
pub use market::MockMarketDataSource;
#[cfg(test)]
pub use search::MockSearchProvider;
