//! Fare API client error types.

/// Errors from the fare API client.
///
/// Any of these reaching the search controller is treated as a network
/// failure: the last good result page is kept and the user may retry.
#[derive(Debug, thiserror::Error)]
pub enum FareApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by fare API")]
    RateLimited,

    /// Invalid API key or unauthorized
    #[error("unauthorized (check FARE_API_KEY)")]
    Unauthorized,

    /// Mock data could not be loaded
    #[error("mock data error: {0}")]
    MockData(String),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {body})"),
        None => String::new(),
    }
}

impl FareApiError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FareApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FareApiError::RateLimited => true,
            FareApiError::Api { status, .. } => *status >= 500,
            FareApiError::Json { .. } | FareApiError::Unauthorized | FareApiError::MockData(_) => {
                false
            }
        }
    }
}
