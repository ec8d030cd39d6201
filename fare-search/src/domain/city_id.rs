//! City identifier type.

use std::fmt;

/// Error returned when a city identifier is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid city id: {reason}")]
pub struct InvalidCityId {
    reason: &'static str,
}

/// The identifier of the city whose lines are being searched.
///
/// Every search is scoped to exactly one city, so a `CityId` is the one
/// piece of context a search session cannot start without. Surrounding
/// whitespace is trimmed and a blank identifier is rejected.
///
/// # Examples
///
/// ```
/// use fare_search::domain::CityId;
///
/// let city = CityId::parse(" 42 ").unwrap();
/// assert_eq!(city.as_str(), "42");
///
/// assert!(CityId::parse("").is_err());
/// assert!(CityId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(String);

impl CityId {
    /// Parse a city identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidCityId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidCityId {
                reason: "must not be blank",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidCityId {
                reason: "must not contain control characters",
            });
        }

        Ok(CityId(trimmed.to_string()))
    }

    /// Parse an optional identifier, treating `None` the same as blank.
    pub fn parse_opt(s: Option<&str>) -> Result<Self, InvalidCityId> {
        match s {
            Some(s) => Self::parse(s),
            None => Err(InvalidCityId {
                reason: "not provided",
            }),
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CityId({})", self.0)
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(CityId::parse("42").is_ok());
        assert!(CityId::parse("1").is_ok());
        assert!(CityId::parse("tehran").is_ok());
    }

    #[test]
    fn trims_whitespace() {
        let city = CityId::parse("  42\t").unwrap();
        assert_eq!(city.as_str(), "42");
        assert_eq!(city, CityId::parse("42").unwrap());
    }

    #[test]
    fn reject_blank() {
        assert!(CityId::parse("").is_err());
        assert!(CityId::parse(" ").is_err());
        assert!(CityId::parse("\n\t").is_err());
    }

    #[test]
    fn reject_control_characters() {
        assert!(CityId::parse("4\u{0}2").is_err());
    }

    #[test]
    fn parse_opt_none_is_missing() {
        let err = CityId::parse_opt(None).unwrap_err();
        assert_eq!(err.to_string(), "invalid city id: not provided");
        assert!(CityId::parse_opt(Some("7")).is_ok());
    }

    #[test]
    fn display_and_debug() {
        let city = CityId::parse("42").unwrap();
        assert_eq!(city.to_string(), "42");
        assert_eq!(format!("{city:?}"), "CityId(42)");
    }
}
