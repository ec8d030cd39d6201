//! Autocomplete suggestions derived from a result page.

use std::collections::HashSet;

use crate::domain::{FilterKey, ResultPage};

/// Distinct non-blank values of one field, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSet(Vec<String>);

impl SuggestionSet {
    fn collect<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Self {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for value in values.flatten() {
            if value.trim().is_empty() {
                continue;
            }
            if seen.insert(value) {
                out.push(value.to_string());
            }
        }

        SuggestionSet(out)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Suggestions for every filterable text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub line_codes: SuggestionSet,
    pub origins: SuggestionSet,
    pub destinations: SuggestionSet,
}

impl Suggestions {
    /// The suggestions for `key`; the city has none.
    pub fn get(&self, key: FilterKey) -> Option<&SuggestionSet> {
        match key {
            FilterKey::CityId => None,
            FilterKey::LineCode => Some(&self.line_codes),
            FilterKey::Origin => Some(&self.origins),
            FilterKey::Destination => Some(&self.destinations),
        }
    }
}

/// Derive suggestions from the lines currently on display.
///
/// Recomputed from scratch for every page: suggestions describe the visible
/// data only.
pub fn derive(page: &ResultPage) -> Suggestions {
    let field = |key: FilterKey| {
        SuggestionSet::collect(page.lines().iter().map(move |line| line.field(key)))
    };

    Suggestions {
        line_codes: field(FilterKey::LineCode),
        origins: field(FilterKey::Origin),
        destinations: field(FilterKey::Destination),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::LineRecord;
    use proptest::prelude::*;

    fn field_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            Just(Some(" ".to_string())),
            "[A-C][0-3]".prop_map(Some),
        ]
    }

    fn page_strategy() -> impl Strategy<Value = ResultPage> {
        prop::collection::vec(
            (field_strategy(), field_strategy(), field_strategy()),
            0..30,
        )
        .prop_map(|rows| {
            let lines = rows
                .into_iter()
                .enumerate()
                .map(|(i, (code, origin, destination))| {
                    let mut line = LineRecord::new(i.to_string());
                    line.code = code;
                    line.origin = origin;
                    line.destination = destination;
                    line
                })
                .collect();
            ResultPage::new(lines, 30)
        })
    }

    proptest! {
        #[test]
        fn derive_is_idempotent(page in page_strategy()) {
            prop_assert_eq!(derive(&page), derive(&page));
        }

        #[test]
        fn suggestions_are_distinct_nonblank_and_present(page in page_strategy()) {
            let s = derive(&page);

            for key in FilterKey::OPTIONAL {
                let set = s.get(key).unwrap();
                let unique: HashSet<&str> = set.iter().collect();
                prop_assert_eq!(unique.len(), set.len());

                for value in set.iter() {
                    prop_assert!(!value.trim().is_empty());
                    prop_assert!(page.lines().iter().any(|l| l.field(key) == Some(value)));
                }

                for line in page.lines() {
                    if let Some(value) = line.field(key).filter(|v| !v.trim().is_empty()) {
                        prop_assert!(set.contains(value));
                    }
                }
            }
        }
    }
}
