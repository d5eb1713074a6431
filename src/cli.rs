//! Command-line interface parsing for Lookout
//!
//! This module handles parsing of CLI arguments using clap, plus resolution
//! of the shared cache store and the RapidAPI key from the environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::store::FileStore;

/// Environment variable holding the RapidAPI key
pub const RAPIDAPI_KEY_ENV: &str = "RAPIDAPI_KEY";

/// Error types for CLI startup
#[derive(Debug, Error)]
pub enum CliError {
    /// No API key available in the environment
    #[error("RAPIDAPI_KEY is not set; export your RapidAPI key to make lookups")]
    MissingApiKey,

    /// No usable default cache location on this platform
    #[error("could not determine a cache directory; pass --cache-file explicitly")]
    NoCacheDir,
}

/// Lookout - IP geolocation, weather, and market lookups with a shared on-disk cache
#[derive(Parser, Debug)]
#[command(name = "lookout")]
#[command(about = "IP geolocation, weather, and market lookups with a shared on-disk cache")]
#[command(version)]
pub struct Cli {
    /// Override the backing cache file location
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available lookups
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Geolocate an IP address (your own when omitted)
    Geo {
        /// IP address to look up
        ip: Option<String>,
    },
    /// Current weather for a location (default: New York)
    Weather {
        /// Place name to look up
        location: Option<String>,
    },
    /// End-of-day stock market data
    Market,
    /// Run all three lookups concurrently
    All {
        /// IP address for the geolocation lookup
        #[arg(long)]
        ip: Option<String>,
        /// Place name for the weather lookup
        #[arg(long)]
        location: Option<String>,
    },
}

/// Resolves the cache store from the `--cache-file` flag, falling back to
/// the platform default location.
pub fn resolve_store(cache_file: Option<PathBuf>) -> Result<FileStore, CliError> {
    match cache_file {
        Some(path) => Ok(FileStore::with_path(path)),
        None => FileStore::open_default().ok_or(CliError::NoCacheDir),
    }
}

/// Reads the RapidAPI key from the environment
pub fn api_key_from_env() -> Result<String, CliError> {
    std::env::var(RAPIDAPI_KEY_ENV).map_err(|_| CliError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geo_without_ip() {
        let cli = Cli::parse_from(["lookout", "geo"]);
        match cli.command {
            Command::Geo { ip } => assert!(ip.is_none()),
            other => panic!("Expected geo command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_geo_with_ip() {
        let cli = Cli::parse_from(["lookout", "geo", "8.8.8.8"]);
        match cli.command {
            Command::Geo { ip } => assert_eq!(ip.as_deref(), Some("8.8.8.8")),
            other => panic!("Expected geo command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_weather_with_location() {
        let cli = Cli::parse_from(["lookout", "weather", "Dublin"]);
        match cli.command {
            Command::Weather { location } => assert_eq!(location.as_deref(), Some("Dublin")),
            other => panic!("Expected weather command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_market() {
        let cli = Cli::parse_from(["lookout", "market"]);
        assert!(matches!(cli.command, Command::Market));
    }

    #[test]
    fn test_parse_all_with_flags() {
        let cli = Cli::parse_from(["lookout", "all", "--ip", "1.1.1.1", "--location", "Tokyo"]);
        match cli.command {
            Command::All { ip, location } => {
                assert_eq!(ip.as_deref(), Some("1.1.1.1"));
                assert_eq!(location.as_deref(), Some("Tokyo"));
            }
            other => panic!("Expected all command, got {other:?}"),
        }
    }

    #[test]
    fn test_cache_file_flag_is_global() {
        let cli = Cli::parse_from(["lookout", "market", "--cache-file", "/tmp/custom.json"]);
        assert_eq!(
            cli.cache_file.as_deref(),
            Some(std::path::Path::new("/tmp/custom.json"))
        );
    }

    #[test]
    fn test_resolve_store_prefers_explicit_path() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("explicit.json");

        let store = resolve_store(Some(path)).expect("Explicit path always resolves");

        // Smoke check: the store is usable against the explicit location
        assert!(store.get("nothing", chrono::Duration::minutes(1)).is_none());
    }

    #[test]
    fn test_api_key_from_env() {
        // Set and unset in one test; parallel tests must not share this var
        std::env::set_var(RAPIDAPI_KEY_ENV, "k-123");
        assert_eq!(api_key_from_env().expect("Key is set"), "k-123");

        std::env::remove_var(RAPIDAPI_KEY_ENV);
        let err = api_key_from_env().expect_err("Missing key is an error");
        assert!(err.to_string().contains(RAPIDAPI_KEY_ENV));
    }
}
