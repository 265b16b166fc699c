//! Yahoo Finance quote client

use super::market::PriceSnapshot;
use crate::error::{DataError, DataResult};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Error texts the Yahoo client produces for symbols it has no data for
const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "404",
    "no data",
    "delisted",
    "noresult",
    "emptydataset",
    "noquotes",
];

/// Yahoo Finance client for latest quotes
pub struct YahooQuoteClient {
    timeout: Duration,
}

impl YahooQuoteClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Get the latest daily quote for a symbol
    pub async fn latest_price(&self, symbol: &str) -> DataResult<PriceSnapshot> {
        let provider = yahoo::YahooConnector::new().map_err(|e| classify(symbol, &e))?;

        debug!(symbol = symbol, "Fetching latest quote");
        let response = tokio::time::timeout(self.timeout, provider.get_latest_quotes(symbol, "1d"))
            .await
            .map_err(|_| {
                DataError::api(
                    PROVIDER,
                    format!("request timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| classify(symbol, &e))?;

        let quote = response.last_quote().map_err(|e| classify(symbol, &e))?;

        Ok(PriceSnapshot {
            symbol: symbol.to_string(),
            price: quote.close,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            volume: quote.volume,
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
        })
    }
}

/// Map a Yahoo client error onto the data error taxonomy
fn classify(symbol: &str, err: &impl std::fmt::Display) -> DataError {
    classify_message(symbol, &err.to_string())
}

fn classify_message(symbol: &str, message: &str) -> DataError {
    let normalized = message.to_ascii_lowercase().replace(['_', ' '], "");
    let lowered = message.to_ascii_lowercase();

    let not_found = NOT_FOUND_MARKERS.iter().any(|marker| {
        if marker.contains(' ') {
            lowered.contains(marker)
        } else {
            normalized.contains(marker)
        }
    });

    if not_found {
        DataError::TickerNotFound(symbol.to_string())
    } else if lowered.contains("429") || lowered.contains("too many requests") {
        DataError::RateLimited(PROVIDER.to_string())
    } else {
        DataError::api(PROVIDER, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        for message in [
            "fetching the data from yahoo! finance failed: 404 Not Found",
            "No data found, symbol may be delisted",
            "NoResult",
            "EmptyDataSet",
            "no quotes found: NoQuotes",
        ] {
            assert!(
                matches!(classify_message("XYZQ", message), DataError::TickerNotFound(ref s) if s == "XYZQ"),
                "{message}"
            );
        }
    }

    #[test]
    fn test_classify_other_errors() {
        assert!(matches!(
            classify_message("AAPL", "429 Too Many Requests"),
            DataError::RateLimited(_)
        ));
        assert!(matches!(
            classify_message("AAPL", "connection reset by peer"),
            DataError::Api { .. }
        ));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_live_quote() {
        let client = YahooQuoteClient::new(Duration::from_secs(30));
        let snapshot = client.latest_price("AAPL").await.unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert!(snapshot.price > 0.0);
    }
}
