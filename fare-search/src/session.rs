//! Asynchronous search session.
//!
//! Runs a [`SearchController`] inside a single Tokio task. User actions and
//! search completions are both messages processed one at a time by that
//! task, so the controller is never touched concurrently and needs no lock.
//! Fetches run as spawned tasks and post their results back; the controller
//! drops any that a newer action has superseded.
//!
//! The latest state is published on a `watch` channel as a [`Snapshot`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::FareApiError;
use crate::domain::{City, CityId, FilterKey, LineRecord, ResultPage};
use crate::search::{
    LineSource, Outcome, SearchConfig, SearchController, SearchError, SearchState, SearchTicket,
    Suggestions,
};

/// Capacity of the command queue.
const COMMAND_QUEUE: usize = 32;

/// Errors from talking to a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("search session closed")]
    Closed,

    /// The action was rejected.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Everything a front end needs to render the search screen.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: SearchState,
    pub city_id: CityId,
    /// Name, county and state of the city, once fetched.
    pub city: Option<City>,
    /// Optional filters currently applied.
    pub filters: BTreeMap<FilterKey, String>,
    pub limit: u32,
    pub page: Arc<ResultPage>,
    pub suggestions: Arc<Suggestions>,
    /// Whether scrolling to the end would load more rows.
    pub has_more: bool,
    /// Transient failure notice for the last search.
    pub last_error: Option<String>,
    /// Generation of the newest search issued.
    pub generation: u64,
}

impl Snapshot {
    fn of(controller: &SearchController, city: Option<City>) -> Self {
        let params = controller.params();
        Self {
            state: controller.state(),
            city_id: params.city_id().clone(),
            city,
            filters: params.filters().clone(),
            limit: params.limit(),
            page: controller.page().clone(),
            suggestions: controller.suggestions().clone(),
            has_more: controller.has_more(),
            last_error: controller.last_error().map(str::to_string),
            generation: controller.generation(),
        }
    }

    /// Whether the city uses custom fare properties (such as a taxi meter)
    /// on any visible line.
    pub fn shows_custom_property_notice(&self) -> bool {
        self.page.has_custom_property()
    }
}

/// Reply to a command: whether a search was issued.
type Reply = oneshot::Sender<Result<bool, SearchError>>;

enum Command {
    SetFilter(FilterKey, String, Reply),
    ClearFilters(Reply),
    LoadMore(Reply),
    Retry(Reply),
    Refresh(Reply),
}

enum Completion {
    Lines(SearchTicket, Result<Vec<LineRecord>, FareApiError>),
    City(CityId, Result<Option<City>, FareApiError>),
}

/// Handle to a running search session.
///
/// Dropping the handle stops the session task; in-flight fetches finish but
/// their results are discarded.
pub struct SearchSession {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl SearchSession {
    /// Start a session for `city_id` and issue its initial search.
    ///
    /// Fails immediately with [`SearchError::MissingContext`] when no usable
    /// city is given. Must be called within a Tokio runtime.
    pub fn start<S>(
        source: Arc<S>,
        city_id: Option<&str>,
        config: SearchConfig,
    ) -> Result<Self, SearchError>
    where
        S: LineSource + 'static,
    {
        let mut controller = SearchController::start(city_id, &config)?;
        let initial = controller.refresh();

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::of(&controller, None));

        info!(city = %controller.params().city_id(), page_size = config.page_size, "search session started");

        let actor = Actor {
            controller,
            source,
            config,
            city: None,
            city_requested: None,
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(actor.run(initial, command_rx));

        Ok(Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        })
    }

    /// Set a filter and search again. A blank value removes the filter.
    pub async fn set_filter(&self, key: FilterKey, value: impl Into<String>) -> Result<bool, SessionError> {
        let value = value.into();
        self.send(|reply| Command::SetFilter(key, value, reply)).await
    }

    /// Remove all optional filters and search again.
    pub async fn clear_filters(&self) -> Result<bool, SessionError> {
        self.send(Command::ClearFilters).await
    }

    /// Load the next page, if there is one.
    ///
    /// Returns `Ok(false)` when the trigger was a no-op.
    pub async fn load_more(&self) -> Result<bool, SessionError> {
        self.send(Command::LoadMore).await
    }

    /// Retry the search that last failed.
    pub async fn retry(&self) -> Result<bool, SessionError> {
        self.send(Command::Retry).await
    }

    /// Search again with the current filters from the first page.
    pub async fn refresh(&self) -> Result<bool, SessionError> {
        self.send(Command::Refresh).await
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait until no search is in flight and return the snapshot.
    pub async fn settled(&self) -> Result<Snapshot, SessionError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.state != SearchState::Loading)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Stop the session task and wait for it to exit.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            warn!(error = %e, "search session task failed");
        }
    }

    async fn send(&self, command: impl FnOnce(Reply) -> Command) -> Result<bool, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        let issued = rx.await.map_err(|_| SessionError::Closed)??;
        Ok(issued)
    }
}

struct Actor<S> {
    controller: SearchController,
    source: Arc<S>,
    config: SearchConfig,
    city: Option<City>,
    /// City whose details were last requested.
    city_requested: Option<CityId>,
    snapshots: watch::Sender<Snapshot>,
}

impl<S: LineSource + 'static> Actor<S> {
    async fn run(mut self, initial: SearchTicket, mut commands: mpsc::Receiver<Command>) {
        let (completion_tx, mut completions) = mpsc::unbounded_channel();
        self.spawn_fetch(initial, &completion_tx);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle_command(command, &completion_tx);
                }
                Some(completion) = completions.recv() => {
                    self.handle_completion(completion);
                }
            }
        }

        debug!(city = %self.controller.params().city_id(), "search session stopped");
    }

    fn handle_command(&mut self, command: Command, completions: &mpsc::UnboundedSender<Completion>) {
        let (result, reply) = match command {
            Command::SetFilter(key, value, reply) => {
                (self.controller.set_filter(key, &value).map(Some), reply)
            }
            Command::ClearFilters(reply) => (Ok(Some(self.controller.clear_filters())), reply),
            Command::LoadMore(reply) => (Ok(self.controller.load_more()), reply),
            Command::Retry(reply) => (Ok(self.controller.retry()), reply),
            Command::Refresh(reply) => (Ok(Some(self.controller.refresh())), reply),
        };

        let reply_value = match result {
            Ok(Some(ticket)) => {
                self.spawn_fetch(ticket, completions);
                self.publish();
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        // The caller may have stopped waiting; nothing to do then.
        let _ = reply.send(reply_value);
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Lines(ticket, result) => {
                match self.controller.complete(&ticket, result) {
                    Outcome::Loaded {
                        rows,
                        first_page,
                        has_more,
                    } => {
                        if first_page && self.controller.page().has_custom_property() {
                            info!(city = %ticket.args().city_id, "city uses custom fare properties");
                        }
                        debug!(rows, has_more, "page loaded");
                    }
                    Outcome::Empty => debug!("no lines matched"),
                    Outcome::Failed(e) => {
                        debug!(transient = e.is_transient(), "keeping previous page after failure");
                    }
                    Outcome::Stale => return,
                }
                self.publish();
            }
            Completion::City(city_id, result) => {
                if &city_id != self.controller.params().city_id() {
                    return;
                }
                match result {
                    Ok(city) => {
                        if city.is_none() {
                            warn!(city = %city_id, "city not found");
                        }
                        self.city = city;
                        self.publish();
                    }
                    Err(e) => {
                        warn!(city = %city_id, error = %e, "failed to fetch city info");
                        self.city_requested = None;
                    }
                }
            }
        }
    }

    /// Run `ticket` on the source in the background.
    ///
    /// The initial search also fetches the city's details in a separate
    /// task, as does the first search after a change of city or after the
    /// last city fetch failed. Lines never wait for the city.
    fn spawn_fetch(&mut self, ticket: SearchTicket, completions: &mpsc::UnboundedSender<Completion>) {
        let source = Arc::clone(&self.source);
        let completions = completions.clone();

        let city_id = &ticket.args().city_id;
        let fetch_city = self.config.fetch_city_info
            && (ticket.is_initial() || self.city_requested.as_ref() != Some(city_id));
        if fetch_city {
            if self.city.as_ref().is_some_and(|c| c.id.to_string() != city_id.as_str()) {
                self.city = None;
            }
            self.city_requested = Some(city_id.clone());

            let source = Arc::clone(&source);
            let completions = completions.clone();
            let city_id = city_id.clone();
            tokio::spawn(async move {
                let city = source.fetch_city(&city_id).await;
                let _ = completions.send(Completion::City(city_id, city));
            });
        }

        tokio::spawn(async move {
            let lines = source.fetch_lines(ticket.args()).await;
            let _ = completions.send(Completion::Lines(ticket, lines));
        });
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(Snapshot::of(&self.controller, self.city.clone()));
    }
}
