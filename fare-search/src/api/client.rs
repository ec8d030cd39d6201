//! Fare API HTTP client.
//!
//! The fare API is a PostgREST-style REST service: each table is a path
//! (`/line`, `/city`) and filters are query parameters whose value carries
//! an operator prefix, e.g. `city_id=eq.42` or `origin=like.*Azadi*`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{City, CityId, FilterKey, LineRecord, LookupArguments, MatchKind};

use super::error::FareApiError;
use super::types::{CityDto, LineDto};

/// Default base URL for the fare API (a local PostgREST instance).
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How much of an unparseable body to keep in the error.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the fare client.
#[derive(Debug, Clone)]
pub struct FareConfig {
    /// Base URL for the API
    pub base_url: String,
    /// API key sent in the `apikey` header, if the server requires one
    pub api_key: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FareConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load the config from the environment.
    ///
    /// - `FARE_API_URL`: base URL (defaults to a local server)
    /// - `FARE_API_KEY`: optional API key
    /// - `FARE_TIMEOUT_SECS`: request timeout
    /// - `FARE_MAX_CONCURRENT`: concurrent request limit
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("FARE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url);

        config.api_key = std::env::var("FARE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if let Some(secs) = std::env::var("FARE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout_secs = secs;
        }

        if let Some(n) = std::env::var("FARE_MAX_CONCURRENT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            config.max_concurrent = n;
        }

        config
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FareConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Fare API client.
///
/// Uses a semaphore to limit concurrent requests.
#[derive(Debug, Clone)]
pub struct FareClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl FareClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FareConfig) -> Result<Self, FareApiError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| FareApiError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
            headers.insert(HeaderName::from_static("apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch the lines matching `args`, in server order.
    pub async fn get_lines(&self, args: &LookupArguments) -> Result<Vec<LineRecord>, FareApiError> {
        let url = format!("{}/line", self.base_url);
        let rows: Vec<LineDto> = self.get_json(&url, &line_query(args)).await?;

        debug!(
            city = %args.city_id,
            limit = args.limit,
            rows = rows.len(),
            "fetched lines"
        );

        Ok(rows.into_iter().map(LineRecord::from).collect())
    }

    /// Fetch a city with its county and state.
    ///
    /// Returns `None` when no city has this id.
    pub async fn get_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        let url = format!("{}/city", self.base_url);
        let rows: Vec<CityDto> = self.get_json(&url, &city_query(city_id)).await?;

        Ok(rows.into_iter().next().map(City::from))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FareApiError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FareApiError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        debug!(url, ?query, "fare API request");

        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FareApiError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FareApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FareApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FareApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
        })
    }
}

/// Encode a filter value with its operator prefix.
///
/// In a `like` pattern, `%`, `_` and `\` are escaped so they match
/// themselves. `*` cannot be escaped and is sent as `_`, matching any one
/// character.
fn operator_value(kind: MatchKind, value: &str) -> String {
    match kind {
        MatchKind::Exact => format!("eq.{value}"),
        MatchKind::Contains => format!("like.*{}*", like_escape(value)),
    }
}

fn like_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Query parameters for a line lookup.
///
/// Absent filters produce no parameter at all.
fn line_query(args: &LookupArguments) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = args
        .constraints()
        .map(|(key, value)| (key.param_name(), operator_value(key.match_kind(), value)))
        .collect();
    query.push(("limit", args.limit.to_string()));
    query
}

/// Query parameters for a city lookup, embedding county and state.
fn city_query(city_id: &CityId) -> Vec<(&'static str, String)> {
    vec![
        ("id", operator_value(FilterKey::CityId.match_kind(), city_id.as_str())),
        ("select", "*,county(*),state(*)".to_string()),
    ]
}
