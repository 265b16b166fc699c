//! Market data types and the source trait used by the financial tools

use super::{FinnhubClient, YahooQuoteClient};
use crate::config::FinanceConfig;
use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days of company news searched backwards from today
const NEWS_LOOKBACK_DAYS: i64 = 7;

/// Latest trading data for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

/// Analyst recommendation counts for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationTrend {
    #[serde(default)]
    pub symbol: String,
    /// First day of the period (`YYYY-MM-DD`)
    pub period: String,
    #[serde(default)]
    pub strong_buy: u32,
    #[serde(default)]
    pub buy: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(default)]
    pub strong_sell: u32,
}

impl RecommendationTrend {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }

    /// Label of the bucket with the most analysts; ties go to the more bullish one
    pub fn consensus(&self) -> &'static str {
        let buckets = [
            ("Strong Buy", self.strong_buy),
            ("Buy", self.buy),
            ("Hold", self.hold),
            ("Sell", self.sell),
            ("Strong Sell", self.strong_sell),
        ];
        let mut best = buckets[0];
        for bucket in &buckets[1..] {
            if bucket.1 > best.1 {
                best = *bucket;
            }
        }
        if best.1 == 0 { "No coverage" } else { best.0 }
    }
}

/// Company profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub ticker: Option<String>,
    pub exchange: Option<String>,
    #[serde(rename = "finnhubIndustry")]
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    /// Market capitalization in millions of `currency`
    pub market_capitalization: Option<f64>,
    pub ipo: Option<String>,
    pub weburl: Option<String>,
}

impl CompanyProfile {
    /// An unknown symbol yields an empty profile object
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ticker.is_none()
    }
}

/// Key valuation metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    /// Percent
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

/// Profile plus metrics for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub profile: CompanyProfile,
    pub metrics: KeyMetrics,
}

/// One company news headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    pub published: DateTime<Utc>,
    pub url: String,
    pub summary: String,
}

/// Source of quotes, analyst data, fundamentals and company news
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest price for an upper-cased symbol
    async fn latest_price(&self, symbol: &str) -> DataResult<PriceSnapshot>;

    /// Recommendation trend, most recent period first
    async fn recommendations(&self, symbol: &str) -> DataResult<Vec<RecommendationTrend>>;

    async fn fundamentals(&self, symbol: &str) -> DataResult<Fundamentals>;

    /// Most recent headlines, newest first, at most `limit`
    async fn company_news(&self, symbol: &str, limit: usize) -> DataResult<Vec<NewsArticle>>;
}

/// Production market data: Yahoo for quotes, Finnhub for everything else
pub struct MarketDataClient {
    yahoo: YahooQuoteClient,
    finnhub: Option<FinnhubClient>,
}

impl MarketDataClient {
    pub fn new(yahoo: YahooQuoteClient, finnhub: Option<FinnhubClient>) -> Self {
        Self { yahoo, finnhub }
    }

    /// Build the clients; Finnhub is only created when its key is configured
    pub fn from_config(config: &FinanceConfig) -> DataResult<Self> {
        let finnhub = config
            .finnhub_api_key
            .as_deref()
            .map(|key| FinnhubClient::new(key, config.finnhub_rate_limit, config.data_timeout))
            .transpose()?;

        Ok(Self::new(YahooQuoteClient::new(config.data_timeout), finnhub))
    }

    fn finnhub(&self) -> DataResult<&FinnhubClient> {
        self.finnhub.as_ref().ok_or(DataError::MissingApiKey {
            provider: "Finnhub",
            env_var: "FINNHUB_API_KEY",
        })
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn latest_price(&self, symbol: &str) -> DataResult<PriceSnapshot> {
        self.yahoo.latest_price(symbol).await
    }

    async fn recommendations(&self, symbol: &str) -> DataResult<Vec<RecommendationTrend>> {
        let mut trends = self.finnhub()?.recommendations(symbol).await?;
        // ISO dates sort lexicographically
        trends.sort_by(|a, b| b.period.cmp(&a.period));
        Ok(trends)
    }

    async fn fundamentals(&self, symbol: &str) -> DataResult<Fundamentals> {
        let finnhub = self.finnhub()?;
        let (profile, metrics) = tokio::try_join!(finnhub.profile(symbol), finnhub.metrics(symbol))?;

        Ok(Fundamentals {
            symbol: symbol.to_string(),
            profile,
            metrics,
        })
    }

    async fn company_news(&self, symbol: &str, limit: usize) -> DataResult<Vec<NewsArticle>> {
        let finnhub = self.finnhub()?;
        let to = Utc::now().date_naive();
        let from = to - Duration::days(NEWS_LOOKBACK_DAYS);

        let mut articles = finnhub.company_news(symbol, from, to).await?;
        if articles.is_empty() {
            // Finnhub answers `[]` for unknown symbols too
            finnhub.profile(symbol).await?;
            return Ok(articles);
        }
        articles.sort_by(|a, b| b.published.cmp(&a.published));
        articles.truncate(limit);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn trend(period: &str, strong_buy: u32, buy: u32, hold: u32) -> RecommendationTrend {
        RecommendationTrend {
            symbol: "NVDA".to_string(),
            period: period.to_string(),
            strong_buy,
            buy,
            hold,
            sell: 0,
            strong_sell: 0,
        }
    }

    #[test]
    fn test_consensus() {
        assert_eq!(trend("2026-10-01", 20, 35, 5).consensus(), "Buy");
        assert_eq!(trend("2026-10-01", 10, 10, 3).consensus(), "Strong Buy");
        assert_eq!(trend("2026-10-01", 0, 0, 0).consensus(), "No coverage");
        assert_eq!(trend("2026-10-01", 20, 35, 5).total(), 60);
    }

    #[test]
    fn test_recommendation_wire_format() {
        let json = r#"{"buy":24,"hold":7,"period":"2026-10-01","sell":0,"strongBuy":13,"strongSell":0,"symbol":"AAPL"}"#;
        let parsed: RecommendationTrend = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.strong_buy, 13);
        assert_eq!(parsed.buy, 24);
    }

    #[test]
    fn test_empty_profile() {
        let profile: CompanyProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.is_empty());

        let profile: CompanyProfile = serde_json::from_str(
            r#"{"name":"Apple Inc","ticker":"AAPL","finnhubIndustry":"Technology","marketCapitalization":4050000.5}"#,
        )
        .unwrap();
        assert!(!profile.is_empty());
        assert_eq!(profile.industry.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn test_missing_finnhub_key() {
        let client = MarketDataClient::new(YahooQuoteClient::new(StdDuration::from_secs(5)), None);

        let err = client.recommendations("AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingApiKey {
                env_var: "FINNHUB_API_KEY",
                ..
            }
        ));
        assert!(client.company_news("AAPL", 5).await.is_err());
        assert!(client.fundamentals("AAPL").await.is_err());
    }
}
