//! Lookup providers for Lookout
//!
//! Each provider fetches a JSON document from a remote API, consulting the
//! shared [`FileStore`](crate::store::FileStore) first and persisting
//! validated responses for the next caller. Payloads stay opaque
//! (`serde_json::Value`); only each provider's success indicator is
//! inspected before caching.

pub mod geo;
pub mod market;
pub mod weather;

pub use geo::{GeoClient, GeoError};
pub use market::{MarketClient, MarketError};
pub use weather::{WeatherClient, WeatherError};

use serde_json::Value;

/// A fetched document plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// The JSON document returned by the provider
    pub value: Value,
    /// True when the document was served from the cache
    pub from_cache: bool,
}
