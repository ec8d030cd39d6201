//! Taxi line records and result pages.

use std::collections::BTreeMap;

use super::FilterKey;

/// One fare entry attached to a line.
///
/// Only the commonly present fields are typed; anything else the API sends
/// is kept in `extra` so nothing is lost when a record is re-serialised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Price {
    pub id: Option<String>,
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single taxi line of a city.
///
/// Records are immutable once received; the result page that contains a
/// record owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    /// Server-side identifier.
    pub id: String,

    /// Line code shown on the taxi stand (e.g. "A1").
    pub code: Option<String>,

    /// Origin name.
    pub origin: Option<String>,

    /// Destination name.
    pub destination: Option<String>,

    /// Whether the line is priced by a custom property such as a taxi meter
    /// rather than a fixed fare.
    pub has_custom_property: bool,

    /// Numeric id of the city the line belongs to, when the API includes it.
    pub city_id: Option<i64>,

    /// Fare entries, when the API includes them.
    pub prices: Option<Vec<Price>>,
}

impl LineRecord {
    /// Create a record with only an id; all optional fields empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: None,
            origin: None,
            destination: None,
            has_custom_property: false,
            city_id: None,
            prices: None,
        }
    }

    /// Set the line code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the origin name.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the destination name.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// The text value of a filterable field.
    ///
    /// `CityId` is numeric on the record and is not a suggestion field, so it
    /// maps to `None`.
    pub fn field(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::CityId => None,
            FilterKey::LineCode => self.code.as_deref(),
            FilterKey::Origin => self.origin.as_deref(),
            FilterKey::Destination => self.destination.as_deref(),
        }
    }
}

/// The ordered lines returned for one search, plus the limit that was asked
/// for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    lines: Vec<LineRecord>,
    requested_limit: u32,
}

impl ResultPage {
    /// Create a page from a response.
    pub fn new(lines: Vec<LineRecord>, requested_limit: u32) -> Self {
        Self {
            lines,
            requested_limit,
        }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The row limit this page was fetched with.
    pub fn requested_limit(&self) -> u32 {
        self.requested_limit
    }

    /// Whether the page returned a full limit's worth of rows, implying more
    /// matching rows may exist.
    pub fn is_saturated(&self) -> bool {
        self.requested_limit > 0 && self.lines.len() >= self.requested_limit as usize
    }

    /// Whether any line on the page is priced by a custom property.
    pub fn has_custom_property(&self) -> bool {
        self.lines.iter().any(|l| l.has_custom_property)
    }
}
