//! Current-weather API client (weatherstack via RapidAPI)
//!
//! Fetches current conditions for a place name. The cached document keeps
//! the response's `current` block plus its `location` block, keyed by the
//! requested location string.

use chrono::Duration;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::{debug, warn};

use super::Lookup;
use crate::store::FileStore;

/// Base URL for the weatherstack current-conditions endpoint
const WEATHERSTACK_BASE_URL: &str = "https://weatherstack.p.rapidapi.com/current";

/// RapidAPI host header value for this provider
const RAPIDAPI_HOST: &str = "weatherstack.p.rapidapi.com";

/// How long a weather result stays fresh, in minutes
const CACHE_TTL_MINUTES: i64 = 30;

/// Outbound request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Location used when the caller does not name one
pub const DEFAULT_LOCATION: &str = "New York";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered without a usable `current` block
    #[error("weather lookup failed upstream: {0}")]
    Upstream(String),
}

/// Client for fetching current weather conditions
#[derive(Debug, Clone)]
pub struct WeatherClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Shared cache for lookup results, keyed by location
    store: FileStore,
    /// RapidAPI key sent with every request
    api_key: String,
}

impl WeatherClient {
    /// Creates a new WeatherClient using the given API key and cache store
    pub fn new(api_key: impl Into<String>, store: FileStore) -> Self {
        Self {
            http_client: Client::new(),
            store,
            api_key: api_key.into(),
        }
    }

    /// Fetches current weather for `location`
    ///
    /// A fresh cached result short-circuits the network. Responses missing
    /// the `current` block are [`WeatherError::Upstream`] and never cached;
    /// a failed cache write is logged and the fetched value still returned.
    pub async fn fetch_current(&self, location: &str) -> Result<Lookup, WeatherError> {
        if let Some(value) = self
            .store
            .get(location, Duration::minutes(CACHE_TTL_MINUTES))
        {
            debug!(location, "weather served from cache");
            return Ok(Lookup {
                value,
                from_cache: true,
            });
        }

        let response = self
            .http_client
            .get(WEATHERSTACK_BASE_URL)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[("query", location)])
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let raw: Value = response.json().await?;

        let value = cacheable_document(&raw)?;

        if let Err(e) = self.store.put(location, value.clone()) {
            warn!(location, error = %e, "failed to persist weather result");
        }

        Ok(Lookup {
            value,
            from_cache: false,
        })
    }
}

/// Builds the document worth caching from a raw weatherstack response:
/// its `current` block plus the `location` block (empty object when the
/// API omits it). A response without `current` is an upstream failure,
/// described by `error.info` when present.
fn cacheable_document(response: &Value) -> Result<Value, WeatherError> {
    let Some(current) = response.get("current") else {
        let info = response
            .pointer("/error/info")
            .and_then(Value::as_str)
            .unwrap_or("unknown API error");
        return Err(WeatherError::Upstream(info.to_string()));
    };

    let mut doc = Map::new();
    doc.insert("current".to_string(), current.clone());
    doc.insert(
        "location".to_string(),
        response
            .get("location")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    );
    Ok(Value::Object(doc))
}
