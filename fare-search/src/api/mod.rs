//! Fare API client.
//!
//! This module provides an HTTP client for the fare API, which serves the
//! taxi lines of Iranian cities together with their fares, plus a mock
//! client backed by JSON files.
//!
//! Key characteristics of the API:
//! - Filters are PostgREST-style: `eq.` for exact, `like.*..*` for contains
//! - A filter the user has not set is omitted from the request entirely
//! - `limit` caps the number of rows; pagination re-requests with a larger
//!   limit rather than an offset

mod client;
mod error;
mod mock;
mod types;

pub use client::{FareClient, FareConfig};
pub use error::FareApiError;
pub use mock::MockFareClient;
pub use types::{CityDto, CountyDto, LineDto, PriceDto, StateDto};
