//! Lookout - IP geolocation, weather, and market lookups from the terminal
//!
//! Each lookup fetches a JSON document from a remote API and shares one
//! on-disk cache, so repeated lookups within the TTL window never touch
//! the network.

mod cli;
mod data;
mod store;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{api_key_from_env, resolve_store, Cli, Command};
use data::{weather::DEFAULT_LOCATION, GeoClient, Lookup, MarketClient, WeatherClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "lookout=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = resolve_store(cli.cache_file)?;
    let api_key = api_key_from_env()?;

    match cli.command {
        Command::Geo { ip } => {
            let client = GeoClient::new(api_key, store);
            let lookup = client.lookup(ip.as_deref().unwrap_or("").trim()).await?;
            print_lookup(&lookup)?;
        }
        Command::Weather { location } => {
            let client = WeatherClient::new(api_key, store);
            let lookup = client
                .fetch_current(location.as_deref().unwrap_or(DEFAULT_LOCATION).trim())
                .await?;
            print_lookup(&lookup)?;
        }
        Command::Market => {
            let client = MarketClient::new(api_key, store);
            let lookup = client.fetch_eod().await?;
            print_lookup(&lookup)?;
        }
        Command::All { ip, location } => {
            run_all(&api_key, store, ip.as_deref(), location.as_deref()).await?;
        }
    }

    Ok(())
}

/// Prints a lookup result as pretty JSON on stdout
fn print_lookup(lookup: &Lookup) -> Result<(), serde_json::Error> {
    if lookup.from_cache {
        tracing::info!("served from cache");
    }
    println!("{}", serde_json::to_string_pretty(&lookup.value)?);
    Ok(())
}

/// Runs all three lookups concurrently against the shared store, printing
/// each section independently so one provider's failure does not suppress
/// the others. Fails only when every lookup failed.
async fn run_all(
    api_key: &str,
    store: store::FileStore,
    ip: Option<&str>,
    location: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let geo = GeoClient::new(api_key, store.clone());
    let weather = WeatherClient::new(api_key, store.clone());
    let market = MarketClient::new(api_key, store);

    let (geo_result, weather_result, market_result) = futures::join!(
        geo.lookup(ip.unwrap_or("").trim()),
        weather.fetch_current(location.unwrap_or(DEFAULT_LOCATION).trim()),
        market.fetch_eod(),
    );

    let any_ok = [
        print_section("Geolocation", geo_result),
        print_section("Weather", weather_result),
        print_section("Market", market_result),
    ]
    .iter()
    .any(|ok| *ok);

    if any_ok {
        Ok(())
    } else {
        Err("all lookups failed".into())
    }
}

/// Prints one titled lookup section, reporting its error on stderr instead
/// of aborting the run. Returns whether the lookup succeeded.
fn print_section<E: std::fmt::Display>(title: &str, result: Result<Lookup, E>) -> bool {
    println!("== {title} ==");
    match result {
        Ok(lookup) => match print_lookup(&lookup) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("failed to render {title} result: {e}");
                false
            }
        },
        Err(e) => {
            eprintln!("{title} lookup failed: {e}");
            false
        }
    }
}
