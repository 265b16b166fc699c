//! Finnhub REST client for analyst, fundamentals and company news data

use super::market::{CompanyProfile, KeyMetrics, NewsArticle, RecommendationTrend};
use crate::error::{DataError, DataResult};
use chrono::{DateTime, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FINNHUB_API_BASE: &str = "https://finnhub.io/api/v1";

const PROVIDER: &str = "Finnhub";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Article as returned by `/company-news`
#[derive(Debug, Deserialize)]
struct FinnhubNewsArticle {
    #[serde(default)]
    datetime: i64,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
}

impl From<FinnhubNewsArticle> for NewsArticle {
    fn from(article: FinnhubNewsArticle) -> Self {
        Self {
            headline: article.headline,
            source: article.source,
            published: DateTime::from_timestamp(article.datetime, 0).unwrap_or_default(),
            url: article.url,
            summary: article.summary,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetricResponse {
    #[serde(default)]
    metric: HashMap<String, Value>,
}

impl MetricResponse {
    /// First numeric value among `keys`
    fn pick(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .find_map(|key| self.metric.get(*key).and_then(Value::as_f64))
    }

    fn into_metrics(self) -> KeyMetrics {
        KeyMetrics {
            pe_ratio: self.pick(&["peTTM", "peBasicExclExtraTTM", "peNormalizedAnnual"]),
            eps: self.pick(&["epsTTM", "epsBasicExclExtraItemsTTM", "epsAnnual"]),
            dividend_yield: self.pick(&[
                "currentDividendYieldTTM",
                "dividendYieldIndicatedAnnual",
            ]),
            beta: self.pick(&["beta"]),
            week_52_high: self.pick(&["52WeekHigh"]),
            week_52_low: self.pick(&["52WeekLow"]),
        }
    }
}

/// Finnhub client with client-side rate limiting
///
/// The key travels in the `X-Finnhub-Token` header so request URLs stay
/// free of credentials.
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> DataResult<Self> {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FINNHUB_API_BASE.to_string(),
            rate_limiter,
        })
    }

    /// Point the client at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> DataResult<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(path = path, "Finnhub request");

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(path = path, "Finnhub rate limit hit");
            return Err(DataError::RateLimited(PROVIDER.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DataError::api(
                PROVIDER,
                format!("request rejected with {status}; check FINNHUB_API_KEY"),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::api(
                PROVIDER,
                format!("{status}: {}", agent_utils::preview(&body, 200)),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DataError::parse(PROVIDER, e.to_string()))
    }

    /// Analyst recommendation trend (`/stock/recommendation`)
    pub async fn recommendations(&self, symbol: &str) -> DataResult<Vec<RecommendationTrend>> {
        let trends: Vec<RecommendationTrend> = self
            .get_json("/stock/recommendation", &[("symbol", symbol)])
            .await?;

        if trends.is_empty() {
            return Err(DataError::TickerNotFound(symbol.to_string()));
        }
        Ok(trends)
    }

    /// Company profile (`/stock/profile2`)
    pub async fn profile(&self, symbol: &str) -> DataResult<CompanyProfile> {
        let profile: CompanyProfile = self.get_json("/stock/profile2", &[("symbol", symbol)]).await?;

        if profile.is_empty() {
            return Err(DataError::TickerNotFound(symbol.to_string()));
        }
        Ok(profile)
    }

    /// Basic financials (`/stock/metric?metric=all`)
    pub async fn metrics(&self, symbol: &str) -> DataResult<KeyMetrics> {
        let response: MetricResponse = self
            .get_json("/stock/metric", &[("symbol", symbol), ("metric", "all")])
            .await?;
        Ok(response.into_metrics())
    }

    /// Company news between two dates, inclusive
    pub async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DataResult<Vec<NewsArticle>> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let articles: Vec<FinnhubNewsArticle> = self
            .get_json(
                "/company-news",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;

        Ok(articles
            .into_iter()
            .filter(|a| !a.headline.is_empty())
            .map(NewsArticle::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> FinnhubClient {
        FinnhubClient::new("fh_test_key", 600, Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_recommendations_sends_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/recommendation"))
            .and(query_param("symbol", "NVDA"))
            .and(header("X-Finnhub-Token", "fh_test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"buy": 40, "hold": 5, "period": "2026-10-01", "sell": 1,
                 "strongBuy": 22, "strongSell": 0, "symbol": "NVDA"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let trends = client(&server).await.recommendations("NVDA").await.unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].strong_buy, 22);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/stock/recommendation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(path("/stock/profile2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert!(matches!(
            client.recommendations("XYZQ").await,
            Err(DataError::TickerNotFound(s)) if s == "XYZQ"
        ));
        assert!(matches!(
            client.profile("XYZQ").await,
            Err(DataError::TickerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_metrics_fallback_keys() {
        let server = MockServer::start().await;
        Mock::given(path("/stock/metric"))
            .and(query_param("metric", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metric": {
                    "peBasicExclExtraTTM": 36.2,
                    "epsTTM": 7.5,
                    "beta": 1.21,
                    "52WeekHigh": 280.1,
                    "52WeekLow": 169.2,
                    "currentDividendYieldTTM": null,
                    "dividendYieldIndicatedAnnual": 0.38
                },
                "series": {}
            })))
            .mount(&server)
            .await;

        let metrics = client(&server).await.metrics("AAPL").await.unwrap();
        assert_eq!(metrics.pe_ratio, Some(36.2));
        assert_eq!(metrics.eps, Some(7.5));
        assert_eq!(metrics.dividend_yield, Some(0.38));
        assert_eq!(metrics.week_52_low, Some(169.2));
    }

    #[tokio::test]
    async fn test_company_news_date_window() {
        let server = MockServer::start().await;
        Mock::given(path("/company-news"))
            .and(query_param("symbol", "TSLA"))
            .and(query_param("from", "2026-10-11"))
            .and(query_param("to", "2026-10-18"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"category": "company", "datetime": 1_792_300_000, "headline": "Deliveries beat estimates",
                 "id": 1, "image": "", "related": "TSLA", "source": "Reuters",
                 "summary": "Quarterly deliveries rose.", "url": "https://example.com/a"},
                {"category": "company", "datetime": 1_792_200_000, "headline": "",
                 "id": 2, "image": "", "related": "TSLA", "source": "Blank",
                 "summary": "", "url": ""}
            ])))
            .mount(&server)
            .await;

        let from = NaiveDate::from_ymd_opt(2026, 10, 11).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let articles = client(&server).await.company_news("TSLA", from, to).await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published.timestamp(), 1_792_300_000);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(path("/stock/recommendation"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(path("/stock/profile2"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;
        Mock::given(path("/stock/metric"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert!(matches!(
            client.recommendations("AAPL").await,
            Err(DataError::RateLimited(_))
        ));
        match client.profile("AAPL").await {
            Err(DataError::Api { message, .. }) => assert!(message.contains("FINNHUB_API_KEY")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            client.metrics("AAPL").await,
            Err(DataError::Parse { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires FINNHUB_API_KEY and network access"]
    async fn test_live_recommendations() {
        let key = std::env::var("FINNHUB_API_KEY").unwrap();
        let client = FinnhubClient::new(key, 60, Duration::from_secs(30)).unwrap();
        let trends = client.recommendations("AAPL").await.unwrap();
        assert!(!trends.is_empty());
    }
}
