//! IP geolocation API client (ipwhois.io via RapidAPI)
//!
//! Looks up geolocation data for an IP address, or for the caller's own IP
//! when given the empty string. Results are cached per IP.

use chrono::Duration;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::{debug, warn};

use super::Lookup;
use crate::store::FileStore;

/// Base URL for the ipwhois geolocation API
const IPWHOIS_BASE_URL: &str = "https://ip-geolocation-ipwhois-io.p.rapidapi.com/json/";

/// RapidAPI host header value for this provider
const RAPIDAPI_HOST: &str = "ip-geolocation-ipwhois-io.p.rapidapi.com";

/// How long a geolocation result stays fresh, in minutes
const CACHE_TTL_MINUTES: i64 = 30;

/// Outbound request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when looking up geolocation data
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered but reported a failed lookup
    #[error("geolocation lookup failed upstream: {0}")]
    Upstream(String),
}

/// Client for fetching IP geolocation data
#[derive(Debug, Clone)]
pub struct GeoClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Shared cache for lookup results, keyed by IP
    store: FileStore,
    /// RapidAPI key sent with every request
    api_key: String,
}

impl GeoClient {
    /// Creates a new GeoClient using the given API key and cache store
    pub fn new(api_key: impl Into<String>, store: FileStore) -> Self {
        Self {
            http_client: Client::new(),
            store,
            api_key: api_key.into(),
        }
    }

    /// Looks up geolocation data for `ip`
    ///
    /// The empty string asks the API about the caller's own address and is
    /// cached under the empty-string key like any other lookup. Fresh cached
    /// results short-circuit the network entirely. A response the API marks
    /// as failed is returned as [`GeoError::Upstream`] and never cached; a
    /// failed cache write is logged and the fetched value still returned.
    pub async fn lookup(&self, ip: &str) -> Result<Lookup, GeoError> {
        if let Some(value) = self.store.get(ip, Duration::minutes(CACHE_TTL_MINUTES)) {
            debug!(ip, "geolocation served from cache");
            return Ok(Lookup {
                value,
                from_cache: true,
            });
        }

        let mut request = self
            .http_client
            .get(IPWHOIS_BASE_URL)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS));
        if !ip.is_empty() {
            request = request.query(&[("ip", ip)]);
        }

        let response = request.send().await?.error_for_status()?;
        let value: Value = response.json().await?;

        if !upstream_success(&value) {
            return Err(GeoError::Upstream(failure_message(&value)));
        }

        if let Err(e) = self.store.put(ip, value.clone()) {
            warn!(ip, error = %e, "failed to persist geolocation result");
        }

        Ok(Lookup {
            value,
            from_cache: false,
        })
    }
}

/// ipwhois marks failed lookups with `"success": false`; an absent flag
/// means the lookup succeeded.
fn upstream_success(response: &Value) -> bool {
    response
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

/// Pulls the API's failure message out of an unsuccessful response
fn failure_message(response: &Value) -> String {
    response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown API error")
        .to_string()
}
