//! Incremental filtered search over a city's taxi lines.
//!
//! The pieces, leaf first:
//! - [`QueryParams`]: the city, optional substring filters and row limit
//! - [`Pagination`]: grows the row limit while pages come back full
//! - [`suggest::derive`]: autocomplete values from the page on display
//! - [`SearchController`]: the state machine tying them together, with
//!   generation numbers to drop stale responses
//!
//! Data comes from any [`LineSource`].

mod config;
mod controller;
mod pagination;
mod params;
mod source;
pub mod suggest;

#[cfg(test)]
mod controller_tests;

pub use config::{DEFAULT_PAGE_SIZE, SearchConfig};
pub use controller::{
    Outcome, RequestKind, SearchController, SearchError, SearchState, SearchTicket,
};
pub use pagination::Pagination;
pub use params::QueryParams;
pub use source::LineSource;
pub use suggest::{SuggestionSet, Suggestions};
