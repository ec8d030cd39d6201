//! Filterable fields of a line search.

use std::fmt;

/// How a filter value is matched against the corresponding field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The field must equal the value.
    Exact,
    /// The value must appear anywhere within the field.
    Contains,
}

/// A named constraint dimension applied to a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    CityId,
    LineCode,
    Origin,
    Destination,
}

impl FilterKey {
    /// All filter keys, mandatory first.
    pub const ALL: [FilterKey; 4] = [
        FilterKey::CityId,
        FilterKey::LineCode,
        FilterKey::Origin,
        FilterKey::Destination,
    ];

    /// The keys a user can set or clear freely, which are also the keys
    /// autocomplete suggestions are derived for.
    pub const OPTIONAL: [FilterKey; 3] =
        [FilterKey::LineCode, FilterKey::Origin, FilterKey::Destination];

    /// Field name used by the fare API.
    pub fn param_name(self) -> &'static str {
        match self {
            FilterKey::CityId => "city_id",
            FilterKey::LineCode => "code",
            FilterKey::Origin => "origin",
            FilterKey::Destination => "destination",
        }
    }

    /// Matching semantics of this key.
    pub fn match_kind(self) -> MatchKind {
        match self {
            FilterKey::CityId => MatchKind::Exact,
            FilterKey::LineCode | FilterKey::Origin | FilterKey::Destination => {
                MatchKind::Contains
            }
        }
    }

    /// Whether a search context is unusable without this key.
    pub fn is_mandatory(self) -> bool {
        matches!(self, FilterKey::CityId)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_name())
    }
}
