//! Arguments of a single line lookup.

use super::{CityId, FilterKey};

/// The request shape consumed by a line source.
///
/// Optional filters are `None` when the user has not set them; a source must
/// then apply no constraint for that field at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupArguments {
    pub city_id: CityId,
    pub line_code: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Maximum number of rows to return. Always positive.
    pub limit: u32,
}

impl LookupArguments {
    /// Lookup for every line of a city, up to `limit` rows.
    pub fn for_city(city_id: CityId, limit: u32) -> Self {
        Self {
            city_id,
            line_code: None,
            origin: None,
            destination: None,
            limit: limit.max(1),
        }
    }

    /// The value constraining `key`, if any.
    pub fn filter(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::CityId => Some(self.city_id.as_str()),
            FilterKey::LineCode => self.line_code.as_deref(),
            FilterKey::Origin => self.origin.as_deref(),
            FilterKey::Destination => self.destination.as_deref(),
        }
    }

    /// Iterate over the constraints that are present, mandatory first.
    pub fn constraints(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        FilterKey::ALL
            .into_iter()
            .filter_map(|key| self.filter(key).map(|v| (key, v)))
    }
}
