use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fare_search::api::{FareClient, FareConfig, MockFareClient};
use fare_search::cache::{CacheConfig, CachedFareClient};
use fare_search::domain::FilterKey;
use fare_search::search::{LineSource, SearchConfig, SearchState};
use fare_search::session::{SearchSession, SessionError, Snapshot};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match std::env::var("FARE_MOCK_DATA") {
        Ok(dir) => match MockFareClient::new(&dir) {
            Ok(mock) => {
                info!(dir = %dir, "using mock fare data");
                run(Arc::new(mock)).await
            }
            Err(e) => {
                error!(error = %e, "failed to load mock data");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => {
            let config = FareConfig::from_env();
            match FareClient::new(config) {
                Ok(client) => {
                    let cached = CachedFareClient::new(client, &CacheConfig::default());
                    run(Arc::new(cached)).await
                }
                Err(e) => {
                    error!(error = %e, "failed to create fare client");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match result {
        Ok(snapshot) if snapshot.state == SearchState::Error => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "search failed");
            ExitCode::FAILURE
        }
    }
}

/// Run one search session from the environment and print what it found.
async fn run<S: LineSource + 'static>(source: Arc<S>) -> Result<Snapshot, SessionError> {
    let city_id = std::env::var("FARE_CITY_ID").ok();
    let pages: u32 = std::env::var("FARE_PAGES")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let session = SearchSession::start(source, city_id.as_deref(), SearchConfig::default())?;

    for (key, var) in [
        (FilterKey::LineCode, "FARE_LINE_CODE"),
        (FilterKey::Origin, "FARE_ORIGIN"),
        (FilterKey::Destination, "FARE_DESTINATION"),
    ] {
        if let Ok(value) = std::env::var(var) {
            session.set_filter(key, value).await?;
        }
    }

    let mut snapshot = session.settled().await?;
    for _ in 1..pages {
        if !session.load_more().await? {
            break;
        }
        snapshot = session.settled().await?;
    }

    // City details are fetched alongside the first page and may trail it.
    snapshot = session.snapshot();
    print_snapshot(&snapshot);

    session.shutdown().await;
    Ok(snapshot)
}

fn print_snapshot(snapshot: &Snapshot) {
    match &snapshot.city {
        Some(city) => println!("City: {}", city.long_name()),
        None => println!("City: {}", snapshot.city_id),
    }
    for (key, value) in &snapshot.filters {
        println!("  {key} ~ {value}");
    }
    println!();

    match snapshot.state {
        SearchState::Empty => println!("No lines found."),
        SearchState::Error => {
            if let Some(message) = &snapshot.last_error {
                println!("Search failed: {message}");
            }
        }
        _ => {}
    }

    for line in snapshot.page.lines() {
        println!(
            "{:>6}  {:<10} {} -> {}",
            line.id,
            line.code.as_deref().unwrap_or("-"),
            line.origin.as_deref().unwrap_or("?"),
            line.destination.as_deref().unwrap_or("?"),
        );
    }

    if snapshot.shows_custom_property_notice() {
        println!();
        println!("Some fares in this city are charged by taxi meter.");
    }

    println!();
    println!(
        "{} lines (limit {}){}",
        snapshot.page.len(),
        snapshot.limit,
        if snapshot.has_more { ", more available" } else { "" }
    );

    for key in FilterKey::OPTIONAL {
        if let Some(values) = snapshot.suggestions.get(key).filter(|v| !v.is_empty()) {
            let joined: Vec<&str> = values.iter().collect();
            println!("{key} suggestions: {}", joined.join(", "));
        }
    }
}
