//! The mutable parameter set of a search.

use std::collections::BTreeMap;

use crate::domain::{CityId, FilterKey, InvalidCityId, LookupArguments};

/// Filter values and row limit of one search session.
///
/// The city is always present. Optional filters are either set to a
/// non-blank value or absent; there is no "set to empty" state, so an absent
/// filter always means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    city_id: CityId,
    filters: BTreeMap<FilterKey, String>,
    limit: u32,
}

impl QueryParams {
    /// Parameters for all lines of `city_id`, up to `limit` rows.
    pub fn new(city_id: CityId, limit: u32) -> Self {
        Self {
            city_id,
            filters: BTreeMap::new(),
            limit: limit.max(1),
        }
    }

    /// Set `key` to `value`, overwriting any previous value.
    ///
    /// A blank value removes an optional filter. Setting the city to a blank
    /// value is rejected and leaves the parameters unchanged.
    pub fn set(&mut self, key: FilterKey, value: &str) -> Result<(), InvalidCityId> {
        if key == FilterKey::CityId {
            self.city_id = CityId::parse(value)?;
            return Ok(());
        }

        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value.to_string());
        }
        Ok(())
    }

    /// The value of `key`, if set.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::CityId => Some(self.city_id.as_str()),
            _ => self.filters.get(&key).map(String::as_str),
        }
    }

    /// Remove every optional filter, keeping the city and the current limit.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn city_id(&self) -> &CityId {
        &self.city_id
    }

    /// Whether any optional filter is set.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// The optional filters that are set.
    pub fn filters(&self) -> &BTreeMap<FilterKey, String> {
        &self.filters
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Replace the row limit. Zero is raised to one.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
    }

    /// Convert to the shape a line source expects.
    ///
    /// Filters that are not set come out as `None`, never as an empty string.
    pub fn as_lookup_arguments(&self) -> LookupArguments {
        LookupArguments {
            city_id: self.city_id.clone(),
            line_code: self.filters.get(&FilterKey::LineCode).cloned(),
            origin: self.filters.get(&FilterKey::Origin).cloned(),
            destination: self.filters.get(&FilterKey::Destination).cloned(),
            limit: self.limit,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Set(FilterKey, String),
        Clear,
        Limit(u32),
    }

    fn key_strategy() -> impl Strategy<Value = FilterKey> {
        prop::sample::select(FilterKey::ALL.to_vec())
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("   ".to_string()),
            "[a-zA-Z0-9 ]{0,12}",
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| Op::Set(k, v)),
            1 => Just(Op::Clear),
            1 => any::<u32>().prop_map(Op::Limit),
        ]
    }

    proptest! {
        #[test]
        fn lookup_arguments_never_carry_blank_filters(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let mut p = QueryParams::new(CityId::parse("42").unwrap(), 20);

            for op in ops {
                match op {
                    Op::Set(key, value) => {
                        let _ = p.set(key, &value);
                    }
                    Op::Clear => p.clear(),
                    Op::Limit(limit) => p.set_limit(limit),
                }

                let args = p.as_lookup_arguments();
                prop_assert!(!args.city_id.as_str().trim().is_empty());
                prop_assert!(args.limit > 0);
                for key in FilterKey::OPTIONAL {
                    if let Some(value) = args.filter(key) {
                        prop_assert!(!value.trim().is_empty(), "{} sent as blank", key);
                    }
                }
            }
        }

        #[test]
        fn set_then_get_agrees_with_lookup(key in key_strategy(), value in value_strategy()) {
            let mut p = QueryParams::new(CityId::parse("42").unwrap(), 20);
            let _ = p.set(key, &value);
            let args = p.as_lookup_arguments();
            prop_assert_eq!(p.get(key), args.filter(key));
        }
    }
}
