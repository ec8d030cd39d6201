//! Search configuration.

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Configuration parameters for a line search session.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Rows requested by the first page; every "load more" grows the limit
    /// by this amount.
    pub page_size: u32,

    /// Whether a session fetches the city's name, county and state alongside
    /// its first page of lines.
    pub fetch_city_info: bool,
}

impl SearchConfig {
    /// Create a new configuration with the given page size.
    ///
    /// A page size of zero is raised to one.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            fetch_city_info: true,
        }
    }

    /// Enable or disable fetching city information.
    pub fn with_city_info(mut self, enabled: bool) -> Self {
        self.fetch_city_info = enabled;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
