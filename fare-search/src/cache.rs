//! Caching layer for fare API responses.
//!
//! Line tables change rarely, while a user typing filters and scrolling
//! tends to repeat the same lookups (clearing filters returns to the
//! unfiltered first page, a retried search repeats the last one). Responses
//! are cached by their full lookup arguments for a short TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::api::{FareApiError, FareClient};
use crate::domain::{City, CityId, LineRecord, LookupArguments};
use crate::search::LineSource;

/// Cached line page entry.
type LinesEntry = Arc<Vec<LineRecord>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per table.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 500,
        }
    }
}

/// Cache for fare API responses.
pub struct FareCache {
    /// Line pages, keyed by the exact lookup that produced them.
    lines: MokaCache<LookupArguments, LinesEntry>,

    /// City rows, including "no such city".
    cities: MokaCache<CityId, Option<City>>,
}

impl FareCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let lines = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        let cities = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { lines, cities }
    }

    /// Get a cached line page.
    pub async fn get_lines(&self, key: &LookupArguments) -> Option<LinesEntry> {
        self.lines.get(key).await
    }

    /// Insert a line page into the cache.
    pub async fn insert_lines(&self, key: LookupArguments, entry: LinesEntry) {
        self.lines.insert(key, entry).await;
    }

    /// Get a cached city row.
    pub async fn get_city(&self, key: &CityId) -> Option<Option<City>> {
        self.cities.get(key).await
    }

    /// Insert a city row into the cache.
    pub async fn insert_city(&self, key: CityId, city: Option<City>) {
        self.cities.insert(key, city).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.lines.entry_count() + self.cities.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.lines.invalidate_all();
        self.cities.invalidate_all();
    }
}

/// Line source with caching.
///
/// Wraps any `LineSource` (the HTTP client by default) and caches its
/// successful responses. Failures are never cached.
pub struct CachedFareClient<S = FareClient> {
    client: S,
    cache: FareCache,
}

impl<S: LineSource> CachedFareClient<S> {
    /// Create a new cached client.
    pub fn new(client: S, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: FareCache::new(cache_config),
        }
    }

    /// Get lines, using the cache if available.
    pub async fn get_lines(&self, args: &LookupArguments) -> Result<LinesEntry, FareApiError> {
        if let Some(cached) = self.cache.get_lines(args).await {
            trace!(city = %args.city_id, limit = args.limit, "line cache hit");
            return Ok(cached);
        }

        let lines = Arc::new(self.client.fetch_lines(args).await?);
        self.cache.insert_lines(args.clone(), lines.clone()).await;

        Ok(lines)
    }

    /// Get a city, using the cache if available.
    pub async fn get_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        if let Some(cached) = self.cache.get_city(city_id).await {
            return Ok(cached);
        }

        let city = self.client.fetch_city(city_id).await?;
        self.cache.insert_city(city_id.clone(), city.clone()).await;

        Ok(city)
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &S {
        &self.client
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: LineSource> LineSource for CachedFareClient<S> {
    async fn fetch_lines(&self, args: &LookupArguments) -> Result<Vec<LineRecord>, FareApiError> {
        let lines = self.get_lines(args).await?;
        Ok(lines.as_ref().clone())
    }

    async fn fetch_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        self.get_city(city_id).await
    }
}
