//! Incremental filtered-search controller.
//!
//! Owns the query parameters, pagination and current result page of one
//! search session, and decides which search to issue for each user action.
//! The controller never performs I/O itself: every action that needs data
//! returns a [`SearchTicket`], the caller fetches the lines for
//! `ticket.args()` and hands the result back through
//! [`SearchController::complete`].
//!
//! Each ticket carries a generation number. Only the response to the newest
//! ticket is applied; responses to superseded tickets are discarded so a
//! slow response can never overwrite newer results.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::FareApiError;
use crate::domain::{CityId, FilterKey, InvalidCityId, LineRecord, LookupArguments, ResultPage};

use super::config::SearchConfig;
use super::pagination::Pagination;
use super::params::QueryParams;
use super::suggest::{Suggestions, derive};

/// Error from a search session.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No usable city was given; nothing can be searched.
    #[error("no city selected: {0}")]
    MissingContext(#[from] InvalidCityId),

    /// The line source failed.
    #[error("fare lookup failed: {0}")]
    Network(#[from] FareApiError),
}

/// Where the controller is in its request/response cycle.
///
/// `Loaded`, `Empty` and `Error` are all terminal until the next search is
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No search has been requested yet.
    Idle,
    /// A search is in flight.
    Loading,
    /// The current page has at least one line.
    Loaded,
    /// The last search matched nothing.
    Empty,
    /// The last search failed; the previous page is still shown.
    Error,
}

/// Why a search was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// The first search of the session.
    Initial,
    /// Parameters changed; the result replaces the page from the first row.
    Refresh,
    /// Same parameters, larger limit.
    LoadMore,
}

/// A search the caller should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    kind: RequestKind,
    args: LookupArguments,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// What to ask the line source for.
    pub fn args(&self) -> &LookupArguments {
        &self.args
    }

    /// Whether this ticket was issued on the Idle to Loading edge.
    pub fn is_initial(&self) -> bool {
        self.kind == RequestKind::Initial
    }
}

/// What applying a response did.
#[derive(Debug)]
pub enum Outcome {
    /// The page was replaced by a non-empty one.
    Loaded {
        rows: usize,
        /// Set for the first page this session ever showed. Front ends hang
        /// their one-time setup (scroll listeners, notices) on it.
        first_page: bool,
        /// Whether a further "load more" would fetch anything.
        has_more: bool,
    },
    /// The search matched nothing; pagination is disabled until the
    /// parameters change.
    Empty,
    /// The source failed; the previous page and parameters are unchanged.
    Failed(FareApiError),
    /// The response belonged to a superseded ticket and was dropped.
    Stale,
}

/// State machine of one line search session.
#[derive(Debug)]
pub struct SearchController {
    params: QueryParams,
    pagination: Pagination,
    state: SearchState,
    page: Arc<ResultPage>,
    suggestions: Arc<Suggestions>,
    generation: u64,
    last_request: Option<(RequestKind, LookupArguments)>,
    last_error: Option<String>,
    shown_first_page: bool,
}

impl SearchController {
    /// Create a controller for all lines of `city_id`.
    pub fn new(city_id: CityId, config: &SearchConfig) -> Self {
        let pagination = Pagination::new(config.page_size);
        Self {
            params: QueryParams::new(city_id, pagination.current_limit()),
            pagination,
            state: SearchState::Idle,
            page: Arc::new(ResultPage::empty()),
            suggestions: Arc::new(Suggestions::default()),
            generation: 0,
            last_request: None,
            last_error: None,
            shown_first_page: false,
        }
    }

    /// Create a controller from an optional, possibly blank city id.
    ///
    /// Fails with [`SearchError::MissingContext`] when there is no usable
    /// city; no search is attempted in that case.
    pub fn start(city_id: Option<&str>, config: &SearchConfig) -> Result<Self, SearchError> {
        let city_id = CityId::parse_opt(city_id)?;
        Ok(Self::new(city_id, config))
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// The page currently on display.
    pub fn page(&self) -> &Arc<ResultPage> {
        &self.page
    }

    /// Suggestions derived from the page on display.
    pub fn suggestions(&self) -> &Arc<Suggestions> {
        &self.suggestions
    }

    /// Generation of the newest ticket issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Message of the last failure, cleared by the next successful search.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a "load more" would currently issue a search.
    pub fn has_more(&self) -> bool {
        self.can_paginate() && self.pagination.next_limit().is_some()
    }

    /// Pagination continues from a loaded page, or from a failed "load more"
    /// so that scrolling again retries it. A failed refresh has no page for
    /// its parameters to continue from.
    fn can_paginate(&self) -> bool {
        match self.state {
            SearchState::Loaded => true,
            SearchState::Error => matches!(
                self.last_request,
                Some((RequestKind::LoadMore, _))
            ),
            SearchState::Idle | SearchState::Loading | SearchState::Empty => false,
        }
    }

    /// Search with the current parameters from the first page.
    ///
    /// From `Idle` this is the initial search of the session.
    pub fn refresh(&mut self) -> SearchTicket {
        self.pagination.reset();
        self.params.set_limit(self.pagination.current_limit());

        let kind = if self.state == SearchState::Idle {
            RequestKind::Initial
        } else {
            RequestKind::Refresh
        };
        let args = self.params.as_lookup_arguments();
        self.issue(kind, args)
    }

    /// Set a filter and search again from the first page.
    ///
    /// A blank value removes an optional filter. A blank city is rejected
    /// and nothing is issued.
    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> Result<SearchTicket, SearchError> {
        self.params.set(key, value)?;
        Ok(self.refresh())
    }

    /// Remove every optional filter and search again from the first page.
    pub fn clear_filters(&mut self) -> SearchTicket {
        self.params.clear();
        self.refresh()
    }

    /// Ask for the next page.
    ///
    /// Returns `None` when there is nothing to do: no page has loaded yet, a
    /// search is already in flight, the last search matched nothing or
    /// failed as a refresh, or the last page was not saturated. Repeated
    /// triggers while a search is in flight are dropped, not queued.
    pub fn load_more(&mut self) -> Option<SearchTicket> {
        if !self.can_paginate() {
            debug!(state = ?self.state, "load more ignored");
            return None;
        }

        let limit = self.pagination.next_limit()?;
        let mut args = self.params.as_lookup_arguments();
        args.limit = limit;
        Some(self.issue(RequestKind::LoadMore, args))
    }

    /// Re-issue the request that last failed.
    ///
    /// Returns `None` unless the controller is in the `Error` state.
    pub fn retry(&mut self) -> Option<SearchTicket> {
        if self.state != SearchState::Error {
            return None;
        }
        let (kind, args) = self.last_request.clone()?;
        Some(self.issue(kind, args))
    }

    fn issue(&mut self, kind: RequestKind, args: LookupArguments) -> SearchTicket {
        self.generation += 1;
        self.state = SearchState::Loading;
        self.last_request = Some((kind, args.clone()));

        debug!(
            generation = self.generation,
            ?kind,
            city = %args.city_id,
            limit = args.limit,
            "issuing search"
        );

        SearchTicket {
            generation: self.generation,
            kind,
            args,
        }
    }

    /// Apply the result of running `ticket`.
    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<LineRecord>, FareApiError>,
    ) -> Outcome {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "discarding stale response"
            );
            return Outcome::Stale;
        }

        let lines = match result {
            Ok(lines) => lines,
            Err(e) => {
                warn!(generation = ticket.generation, error = %e, "search failed");
                self.state = SearchState::Error;
                self.last_error = Some(e.to_string());
                return Outcome::Failed(e);
            }
        };

        let limit = ticket.args.limit;
        let rows = lines.len();

        self.last_error = None;
        self.params.set_limit(limit);
        let page = ResultPage::new(lines, limit);
        self.pagination.record_page(&page);
        self.page = Arc::new(page);
        self.suggestions = Arc::new(derive(&self.page));

        if rows == 0 {
            debug!(generation = ticket.generation, "search matched nothing");
            self.state = SearchState::Empty;
            return Outcome::Empty;
        }

        self.state = SearchState::Loaded;
        let first_page = !self.shown_first_page;
        self.shown_first_page = true;

        debug!(
            generation = ticket.generation,
            rows,
            limit,
            has_more = self.pagination.has_more(),
            "search applied"
        );

        Outcome::Loaded {
            rows,
            first_page,
            has_more: self.pagination.has_more(),
        }
    }
}
