//! Unit tests for the search controller state machine.

use super::*;
use crate::api::FareApiError;
use crate::domain::{CityId, FilterKey, LineRecord};

fn config() -> SearchConfig {
    SearchConfig::new(20)
}

fn controller() -> SearchController {
    SearchController::new(CityId::parse("42").unwrap(), &config())
}

fn rows(n: usize) -> Vec<LineRecord> {
    (0..n)
        .map(|i| {
            LineRecord::new(i.to_string())
                .with_code(format!("A{}", i % 3))
                .with_origin(format!("Origin {}", i % 4))
        })
        .collect()
}

fn network_error() -> FareApiError {
    FareApiError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

/// Issue the initial search and apply a response of `n` rows.
fn loaded_with(n: usize) -> SearchController {
    let mut c = controller();
    let ticket = c.refresh();
    c.complete(&ticket, Ok(rows(n)));
    c
}

#[test]
fn starts_idle() {
    let c = controller();
    assert_eq!(c.state(), SearchState::Idle);
    assert!(c.page().is_empty());
    assert_eq!(c.generation(), 0);
    assert!(!c.has_more());
}

#[test]
fn start_without_city_is_missing_context() {
    let result = SearchController::start(None, &config());
    assert!(matches!(result, Err(SearchError::MissingContext(_))));

    let result = SearchController::start(Some("  "), &config());
    assert!(matches!(result, Err(SearchError::MissingContext(_))));

    let c = SearchController::start(Some("42"), &config()).unwrap();
    assert_eq!(c.params().city_id().as_str(), "42");
}

#[test]
fn first_search_is_initial() {
    let mut c = controller();
    let ticket = c.refresh();

    assert!(ticket.is_initial());
    assert_eq!(ticket.generation(), 1);
    assert_eq!(ticket.args().limit, 20);
    assert_eq!(c.state(), SearchState::Loading);

    let second = c.refresh();
    assert_eq!(second.kind(), RequestKind::Refresh);
}

#[test]
fn loaded_page_derives_suggestions() {
    let mut c = controller();
    let ticket = c.refresh();

    let outcome = c.complete(&ticket, Ok(rows(20)));

    assert!(matches!(
        outcome,
        Outcome::Loaded {
            rows: 20,
            first_page: true,
            has_more: true
        }
    ));
    assert_eq!(c.state(), SearchState::Loaded);
    assert_eq!(c.page().len(), 20);
    assert_eq!(c.suggestions().line_codes.len(), 3);
    assert_eq!(c.suggestions().origins.len(), 4);
}

#[test]
fn first_page_flag_is_raised_once() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::Origin, "Origin 1").unwrap();

    let outcome = c.complete(&ticket, Ok(rows(5)));
    assert!(matches!(
        outcome,
        Outcome::Loaded {
            first_page: false,
            ..
        }
    ));
}

#[test]
fn saturated_page_then_short_page() {
    // CityId 42, limit 20, 20 rows back: next load more asks for 40.
    let mut c = loaded_with(20);

    let ticket = c.load_more().unwrap();
    assert_eq!(ticket.kind(), RequestKind::LoadMore);
    assert_eq!(ticket.args().limit, 40);
    assert_eq!(ticket.args().city_id.as_str(), "42");

    // 5 rows for limit 40: end of data.
    let outcome = c.complete(&ticket, Ok(rows(5)));
    assert!(matches!(outcome, Outcome::Loaded { has_more: false, .. }));
    assert_eq!(c.params().limit(), 40);

    assert!(c.load_more().is_none());
    assert!(c.load_more().is_none());
    assert!(!c.has_more());
}

#[test]
fn short_first_page_disables_load_more() {
    let mut c = loaded_with(7);
    assert!(c.load_more().is_none());
}

#[test]
fn load_more_keeps_filters() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::LineCode, "A1").unwrap();
    c.complete(&ticket, Ok(rows(20)));

    let ticket = c.load_more().unwrap();
    assert_eq!(ticket.args().line_code.as_deref(), Some("A1"));
    assert_eq!(ticket.args().limit, 40);
}

#[test]
fn limit_grows_by_page_size() {
    let mut c = loaded_with(20);
    for expected in [40, 60, 80] {
        let ticket = c.load_more().unwrap();
        assert_eq!(ticket.args().limit, expected);
        c.complete(&ticket, Ok(rows(expected as usize)));
    }
    assert_eq!(c.params().limit(), 80);
}

#[test]
fn load_more_while_loading_is_ignored() {
    let mut c = loaded_with(20);
    let ticket = c.load_more().unwrap();

    assert!(c.load_more().is_none());
    assert_eq!(c.generation(), ticket.generation());
}

#[test]
fn load_more_before_first_page_is_ignored() {
    let mut c = controller();
    assert!(c.load_more().is_none());

    let _ticket = c.refresh();
    assert!(c.load_more().is_none());
}

#[test]
fn filter_change_resets_pagination() {
    let mut c = loaded_with(20);
    let ticket = c.load_more().unwrap();
    c.complete(&ticket, Ok(rows(40)));
    assert_eq!(c.params().limit(), 40);

    let ticket = c.set_filter(FilterKey::Destination, "Airport").unwrap();
    assert_eq!(ticket.kind(), RequestKind::Refresh);
    assert_eq!(ticket.args().limit, 20);
    assert_eq!(ticket.args().destination.as_deref(), Some("Airport"));
}

#[test]
fn filter_change_after_end_of_data_reenables_paging() {
    let mut c = loaded_with(3);
    assert!(c.load_more().is_none());

    let ticket = c.set_filter(FilterKey::Origin, "Golsar").unwrap();
    c.complete(&ticket, Ok(rows(20)));
    assert!(c.load_more().is_some());
}

#[test]
fn clear_filters_keeps_city_and_resets_limit() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::Origin, "Golsar").unwrap();
    c.complete(&ticket, Ok(rows(20)));
    let ticket = c.load_more().unwrap();
    c.complete(&ticket, Ok(rows(40)));

    let ticket = c.clear_filters();

    assert_eq!(ticket.args().origin, None);
    assert_eq!(ticket.args().city_id.as_str(), "42");
    assert_eq!(ticket.args().limit, 20);
    assert!(!c.params().has_filters());
}

#[test]
fn empty_origin_is_not_sent() {
    let mut c = loaded_with(20);

    let ticket = c.set_filter(FilterKey::Origin, "").unwrap();
    assert_eq!(ticket.args().origin, None);

    let ticket = c.set_filter(FilterKey::Origin, "Tehran").unwrap();
    assert_eq!(ticket.args().origin.as_deref(), Some("Tehran"));
}

#[test]
fn blank_city_filter_is_rejected_without_search() {
    let mut c = loaded_with(20);
    let generation = c.generation();

    let result = c.set_filter(FilterKey::CityId, "");

    assert!(matches!(result, Err(SearchError::MissingContext(_))));
    assert_eq!(c.generation(), generation);
    assert_eq!(c.state(), SearchState::Loaded);
    assert_eq!(c.params().city_id().as_str(), "42");
}

#[test]
fn empty_result_is_not_an_error() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::LineCode, "ZZZ").unwrap();

    let outcome = c.complete(&ticket, Ok(Vec::new()));

    assert!(matches!(outcome, Outcome::Empty));
    assert_eq!(c.state(), SearchState::Empty);
    assert!(c.page().is_empty());
    assert_eq!(c.suggestions().line_codes.len(), 0);
    assert!(c.load_more().is_none());
    assert!(c.last_error().is_none());
}

#[test]
fn failure_keeps_last_good_page() {
    let mut c = loaded_with(20);
    let page_before = c.page().clone();
    let suggestions_before = c.suggestions().clone();

    let ticket = c.set_filter(FilterKey::Origin, "Golsar").unwrap();
    let outcome = c.complete(&ticket, Err(network_error()));

    assert!(matches!(outcome, Outcome::Failed(FareApiError::Api { status: 503, .. })));
    assert_eq!(c.state(), SearchState::Error);
    assert_eq!(c.page(), &page_before);
    assert_eq!(c.suggestions(), &suggestions_before);
    assert_eq!(
        c.last_error(),
        Some("API error 503: Service Unavailable")
    );
    // The filter the user typed stays set so retrying repeats it.
    assert_eq!(c.params().get(FilterKey::Origin), Some("Golsar"));
}

#[test]
fn failed_refresh_does_not_paginate() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::Origin, "Golsar").unwrap();
    c.complete(&ticket, Err(network_error()));

    assert!(c.load_more().is_none());
}

#[test]
fn failed_load_more_keeps_limit_and_can_be_retried_by_scrolling() {
    let mut c = loaded_with(20);
    let ticket = c.load_more().unwrap();
    c.complete(&ticket, Err(network_error()));

    assert_eq!(c.state(), SearchState::Error);
    assert_eq!(c.params().limit(), 20);
    assert_eq!(c.page().len(), 20);

    let again = c.load_more().unwrap();
    assert_eq!(again.args().limit, 40);
    assert!(again.generation() > ticket.generation());
}

#[test]
fn retry_reissues_failed_request() {
    let mut c = loaded_with(20);
    let ticket = c.set_filter(FilterKey::LineCode, "A1").unwrap();
    c.complete(&ticket, Err(network_error()));

    let retried = c.retry().unwrap();
    assert_eq!(retried.args(), ticket.args());
    assert_eq!(retried.kind(), ticket.kind());
    assert_eq!(retried.generation(), ticket.generation() + 1);

    c.complete(&retried, Ok(rows(4)));
    assert_eq!(c.state(), SearchState::Loaded);
    assert!(c.last_error().is_none());
}

#[test]
fn retry_outside_error_state_does_nothing() {
    let mut c = controller();
    assert!(c.retry().is_none());

    let mut c = loaded_with(20);
    assert!(c.retry().is_none());
}

#[test]
fn failed_initial_search_retries_as_initial() {
    let mut c = controller();
    let ticket = c.refresh();
    c.complete(&ticket, Err(network_error()));

    let retried = c.retry().unwrap();
    assert!(retried.is_initial());

    let outcome = c.complete(&retried, Ok(rows(2)));
    assert!(matches!(outcome, Outcome::Loaded { first_page: true, .. }));
}

#[test]
fn stale_response_does_not_overwrite_newer_page() {
    let mut c = loaded_with(20);

    let g1 = c.set_filter(FilterKey::Origin, "Origin 1").unwrap();
    let g2 = c.set_filter(FilterKey::Origin, "Origin 2").unwrap();
    assert!(g2.generation() > g1.generation());

    let newer = vec![LineRecord::new("new").with_origin("Origin 2")];
    assert!(matches!(c.complete(&g2, Ok(newer)), Outcome::Loaded { .. }));

    let older = vec![LineRecord::new("old").with_origin("Origin 1")];
    assert!(matches!(c.complete(&g1, Ok(older)), Outcome::Stale));

    assert_eq!(c.page().lines()[0].id, "new");
    assert!(c.suggestions().origins.contains("Origin 2"));
    assert!(!c.suggestions().origins.contains("Origin 1"));
}

#[test]
fn stale_response_arriving_first_is_dropped() {
    let mut c = loaded_with(20);

    let g1 = c.set_filter(FilterKey::Origin, "Origin 1").unwrap();
    let g2 = c.set_filter(FilterKey::Origin, "Origin 2").unwrap();

    assert!(matches!(c.complete(&g1, Ok(rows(1))), Outcome::Stale));
    assert_eq!(c.state(), SearchState::Loading);

    c.complete(&g2, Ok(rows(3)));
    assert_eq!(c.page().len(), 3);
}

#[test]
fn stale_failure_is_silent() {
    let mut c = loaded_with(20);

    let g1 = c.set_filter(FilterKey::Origin, "Origin 1").unwrap();
    let g2 = c.set_filter(FilterKey::Origin, "Origin 2").unwrap();

    assert!(matches!(c.complete(&g1, Err(network_error())), Outcome::Stale));
    assert!(c.last_error().is_none());

    c.complete(&g2, Ok(rows(3)));
    assert_eq!(c.state(), SearchState::Loaded);
}

#[test]
fn superseded_load_more_is_stale() {
    let mut c = loaded_with(20);
    let more = c.load_more().unwrap();
    let refresh = c.set_filter(FilterKey::LineCode, "A2").unwrap();

    assert!(matches!(c.complete(&more, Ok(rows(40))), Outcome::Stale));
    c.complete(&refresh, Ok(rows(6)));

    assert_eq!(c.params().limit(), 20);
    assert_eq!(c.page().len(), 6);
}

#[test]
fn custom_property_flag_reaches_page() {
    let mut c = controller();
    let ticket = c.refresh();

    let mut metered = LineRecord::new("m");
    metered.has_custom_property = true;
    c.complete(&ticket, Ok(vec![LineRecord::new("a"), metered]));

    assert!(c.page().has_custom_property());
}
