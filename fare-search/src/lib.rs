//! Taxi fare line search.
//!
//! Looks up the taxi lines of a city from a fare API, narrows them by line
//! code, origin and destination, loads further pages on demand and offers
//! autocomplete suggestions drawn from the lines currently shown.

pub mod api;
pub mod cache;
pub mod domain;
pub mod search;
pub mod session;
