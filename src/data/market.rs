//! Stock market EOD API client (marketstack via RapidAPI)
//!
//! Fetches end-of-day records for a fixed symbol set. Unlike the other
//! providers this one has a single subject, so the whole result lives under
//! one cache key.

use chrono::Duration;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::{debug, warn};

use super::Lookup;
use crate::store::FileStore;

/// Base URL for the marketstack end-of-day endpoint
const MARKETSTACK_BASE_URL: &str = "https://marketstack.p.rapidapi.com/v1/eod";

/// RapidAPI host header value for this provider
const RAPIDAPI_HOST: &str = "marketstack.p.rapidapi.com";

/// Symbols requested from the API
const SYMBOLS: &str = "AAPL";

/// Number of EOD records to request
const RECORD_LIMIT: u32 = 5;

/// Cache key for the fixed symbol set
const EOD_CACHE_KEY: &str = "eod_aapl";

/// How long market data stays fresh, in hours
const CACHE_TTL_HOURS: i64 = 1;

/// Outbound request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when fetching market data
#[derive(Debug, Error)]
pub enum MarketError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Missing expected field in response
    #[error("missing expected field in response: {0}")]
    MissingField(String),
}

/// Client for fetching end-of-day market data
#[derive(Debug, Clone)]
pub struct MarketClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Shared cache for the EOD records
    store: FileStore,
    /// RapidAPI key sent with every request
    api_key: String,
}

impl MarketClient {
    /// Creates a new MarketClient using the given API key and cache store
    pub fn new(api_key: impl Into<String>, store: FileStore) -> Self {
        Self {
            http_client: Client::new(),
            store,
            api_key: api_key.into(),
        }
    }

    /// Fetches the latest end-of-day records
    ///
    /// Returns the `data` array of the marketstack response. Responses
    /// without a `data` array are [`MarketError::MissingField`] and never
    /// cached; a failed cache write is logged and the fetched records
    /// still returned.
    pub async fn fetch_eod(&self) -> Result<Lookup, MarketError> {
        if let Some(value) = self
            .store
            .get(EOD_CACHE_KEY, Duration::hours(CACHE_TTL_HOURS))
        {
            debug!("market data served from cache");
            return Ok(Lookup {
                value,
                from_cache: true,
            });
        }

        let limit = RECORD_LIMIT.to_string();
        let response = self
            .http_client
            .get(MARKETSTACK_BASE_URL)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[("symbols", SYMBOLS), ("limit", limit.as_str())])
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let raw: Value = response.json().await?;

        let value = eod_records(&raw)?;

        if let Err(e) = self.store.put(EOD_CACHE_KEY, value.clone()) {
            warn!(error = %e, "failed to persist market data");
        }

        Ok(Lookup {
            value,
            from_cache: false,
        })
    }
}

/// Extracts the EOD record array from a marketstack response
fn eod_records(response: &Value) -> Result<Value, MarketError> {
    response
        .get("data")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| MarketError::MissingField("data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_eod_records_extracts_data_array() {
        let raw = json!({
            "pagination": {"limit": 5, "total": 252},
            "data": [
                {"symbol": "AAPL", "close": 229.87},
                {"symbol": "AAPL", "close": 228.02}
            ]
        });

        let records = eod_records(&raw).expect("Response with data array is cacheable");
        assert_eq!(
            records,
            json!([
                {"symbol": "AAPL", "close": 229.87},
                {"symbol": "AAPL", "close": 228.02}
            ])
        );
    }

    #[test]
    fn test_eod_records_rejects_missing_data() {
        let err = eod_records(&json!({"error": {"code": "invalid_access_key"}}))
            .expect_err("Response without data array must not be cached");
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_eod_records_rejects_non_array_data() {
        let err = eod_records(&json!({"data": "not records"}))
            .expect_err("Non-array data field must not be cached");
        assert!(err.to_string().contains("data"));
    }

    #[tokio::test]
    async fn test_fetch_eod_serves_fresh_cache_without_network() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_path(temp_dir.path().join("cache.json"));
        let client = MarketClient::new("test-key", store.clone());

        let records = json!([{"symbol": "AAPL", "close": 231.5}]);
        store
            .put(EOD_CACHE_KEY, records.clone())
            .expect("Seed should succeed");

        let lookup = client.fetch_eod().await.expect("Cached fetch should succeed");

        assert!(lookup.from_cache);
        assert_eq!(lookup.value, records);
    }
}
