//! Mock fare client for testing without API access.
//!
//! Loads line tables from JSON files and serves them with the same
//! filtering semantics as the real API.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{City, CityId, FilterKey, LineRecord, LookupArguments};

use super::error::FareApiError;
use super::types::{CityDto, LineDto};

/// File holding the city rows, alongside the per-city line files.
const CITIES_FILE: &str = "cities.json";

#[derive(Default)]
struct MockData {
    lines: HashMap<CityId, Vec<LineRecord>>,
    cities: HashMap<CityId, City>,
}

/// Mock fare client that serves data from JSON files.
///
/// Useful for development and testing without a running fare API.
#[derive(Clone, Default)]
pub struct MockFareClient {
    data: Arc<RwLock<MockData>>,
    requests: Arc<AtomicUsize>,
}

impl MockFareClient {
    /// Create a mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{city_id}.json` holding an array of line rows,
    /// and optionally `cities.json` holding an array of city rows.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FareApiError> {
        let data = load_dir(data_dir.as_ref())?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            requests: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Create a mock client serving the given lines for one city.
    pub fn with_lines(city_id: CityId, lines: Vec<LineRecord>) -> Self {
        let mut data = MockData::default();
        data.lines.insert(city_id, lines);
        Self {
            data: Arc::new(RwLock::new(data)),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add or replace a city row.
    pub async fn insert_city(&self, city_id: CityId, city: City) {
        self.data.write().await.cities.insert(city_id, city);
    }

    /// Fetch the lines matching `args`.
    ///
    /// Mimics `FareClient::get_lines`: the city must match exactly, every
    /// present optional filter must be contained in its field, and at most
    /// `limit` rows are returned. A city without data yields no rows.
    ///
    /// As on the server, a `*` in a filter stands for any single character;
    /// every other character matches itself.
    pub async fn get_lines(&self, args: &LookupArguments) -> Result<Vec<LineRecord>, FareApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read().await;

        let Some(lines) = data.lines.get(&args.city_id) else {
            debug!(city = %args.city_id, "no mock lines for city");
            return Ok(Vec::new());
        };

        Ok(lines
            .iter()
            .filter(|line| matches(line, args))
            .take(args.limit as usize)
            .cloned()
            .collect())
    }

    /// Fetch a city row.
    pub async fn get_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(self.data.read().await.cities.get(city_id).cloned())
    }

    /// Cities that have line data.
    pub async fn available_cities(&self) -> Vec<CityId> {
        let mut cities: Vec<CityId> = self.data.read().await.lines.keys().cloned().collect();
        cities.sort();
        cities
    }

    /// Number of requests served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// Reload mock data from disk (useful for development).
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), FareApiError> {
        let fresh = load_dir(data_dir.as_ref())?;
        *self.data.write().await = fresh;
        Ok(())
    }
}

/// Whether `line` satisfies every optional constraint of `args`.
///
/// The city constraint is applied by the table lookup itself; the optional
/// filters are all substring matches.
fn matches(line: &LineRecord, args: &LookupArguments) -> bool {
    FilterKey::OPTIONAL.into_iter().all(|key| match args.filter(key) {
        Some(wanted) => line.field(key).is_some_and(|field| contains(field, wanted)),
        None => true,
    })
}

/// Substring match where `*` in `pattern` matches any one character.
fn contains(field: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return field.contains(pattern);
    }
    let field: Vec<char> = field.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    field
        .windows(pattern.len())
        .any(|w| w.iter().zip(&pattern).all(|(f, p)| *p == '*' || f == p))
}

fn load_dir(data_dir: &Path) -> Result<MockData, FareApiError> {
    let mut data = MockData::default();

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        FareApiError::MockData(format!("failed to read mock data directory: {e}"))
    })?;

    for entry in entries {
        let entry = entry
            .map_err(|e| FareApiError::MockData(format!("failed to read directory entry: {e}")))?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let json = std::fs::read_to_string(&path)
            .map_err(|e| FareApiError::MockData(format!("failed to read {path:?}: {e}")))?;

        if path.file_name().and_then(|s| s.to_str()) == Some(CITIES_FILE) {
            let rows: Vec<CityDto> = serde_json::from_str(&json)
                .map_err(|e| FareApiError::MockData(format!("failed to parse {path:?}: {e}")))?;
            for row in rows {
                let city = City::from(row);
                if let Ok(id) = CityId::parse(&city.id.to_string()) {
                    data.cities.insert(id, city);
                }
            }
            continue;
        }

        // Extract the city id from the filename (e.g. "42.json" -> "42")
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FareApiError::MockData(format!("invalid filename: {path:?}")))?;

        let city_id = CityId::parse(stem)
            .map_err(|e| FareApiError::MockData(format!("{e} in filename {path:?}")))?;

        let rows: Vec<LineDto> = serde_json::from_str(&json)
            .map_err(|e| FareApiError::MockData(format!("failed to parse {path:?}: {e}")))?;

        data.lines
            .insert(city_id, rows.into_iter().map(LineRecord::from).collect());
    }

    if data.lines.is_empty() {
        return Err(FareApiError::MockData(format!(
            "no mock line files found in {data_dir:?}"
        )));
    }

    Ok(data)
}
