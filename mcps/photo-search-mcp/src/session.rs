//! Search session - state machine and controller
//!
//! [`SessionState`] changes only through [`SessionState::apply`], a pure
//! transition over [`SessionEvent`]s:
//!
//! ```text
//! idle -> loading -> ready | error
//! ready | error -> loading          (new search)
//! ready -> ready                    (view change, no fetch)
//! ```
//!
//! Every search gets a monotonically increasing request id. Completion
//! events carrying an id other than the latest are ignored, so a slow,
//! superseded fetch can never overwrite a newer one.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::analytics::AnalyticsTracker;
use crate::config::Config;
use crate::error::FeedResult;
use crate::feed::PhotoFeedClient;
use crate::history::{FileStore, SearchHistoryStore};
use crate::projector::project;
use crate::types::{PhotoRecord, ProjectedView, SessionStatus, ViewParameters, ViewPatch};

/// What the user sees when a fetch fails; the cause only goes to the log
pub const FETCH_ERROR_MESSAGE: &str = "Could not load photos. Please try again.";

/// Shown before the first search
pub const IDLE_NOTICE: &str = "Enter a search term to see results";

/// Inputs to the session state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SearchStarted { term: String, request_id: u64 },
    SearchSucceeded { request_id: u64, results: Vec<PhotoRecord> },
    SearchFailed { request_id: u64, message: String },
    ViewChanged(ViewPatch),
    ViewReset,
}

/// Canonical state of one search session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub last_query: String,
    pub results: Vec<PhotoRecord>,
    pub error_message: Option<String>,
    pub view: ViewParameters,
    /// Derived from `results` and `view`, refreshed on every change to either
    pub projection: ProjectedView,
    /// Id of the most recently started search
    pub request_id: u64,
}

impl SessionState {
    pub fn new(view: ViewParameters) -> Self {
        Self {
            projection: project(&[], &view),
            view,
            ..Self::default()
        }
    }

    /// Whether `request_id` belongs to the latest search
    pub fn is_current(&self, request_id: u64) -> bool {
        self.request_id == request_id && self.status == SessionStatus::Loading
    }

    /// Apply one event, returning the next state
    pub fn apply(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::SearchStarted { term, request_id } => {
                let term = term.trim();
                if term.is_empty() {
                    return self;
                }
                self.status = SessionStatus::Loading;
                self.error_message = None;
                self.last_query = term.to_string();
                self.view.page = 1;
                self.request_id = request_id;
            }
            SessionEvent::SearchSucceeded {
                request_id,
                results,
            } => {
                if !self.is_current(request_id) {
                    return self;
                }
                self.status = SessionStatus::Ready;
                self.results = results;
            }
            SessionEvent::SearchFailed {
                request_id,
                message,
            } => {
                if !self.is_current(request_id) {
                    return self;
                }
                self.status = SessionStatus::Error;
                self.results.clear();
                self.error_message = Some(message);
            }
            SessionEvent::ViewChanged(patch) => self.view.merge(&patch),
            SessionEvent::ViewReset => {
                self.view = ViewParameters::with_page_size(self.view.page_size);
            }
        }

        self.projection = project(&self.results, &self.view);
        self
    }
}

/// Read-only view of the session handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub last_query: String,
    pub view: ViewParameters,
    pub projected_view: ProjectedView,
    pub history: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Results before filtering
    pub result_count: usize,
}

impl SessionSnapshot {
    /// Empty-state hint for the result area, if one applies
    pub fn notice(&self) -> Option<String> {
        match self.status {
            SessionStatus::Idle => Some(IDLE_NOTICE.to_string()),
            SessionStatus::Ready if self.projected_view.total_count == 0 => {
                Some(format!("No photos found for \"{}\"", self.last_query))
            }
            _ => None,
        }
    }
}

struct SessionInner {
    state: SessionState,
    history: Vec<String>,
    next_request: u64,
}

/// Coordinates searches, history and the projected view
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SearchSessionController {
    inner: Arc<Mutex<SessionInner>>,
    feed: PhotoFeedClient,
    history: SearchHistoryStore,
    analytics: AnalyticsTracker,
}

impl SearchSessionController {
    pub fn new(
        feed: PhotoFeedClient,
        history: SearchHistoryStore,
        analytics: AnalyticsTracker,
        view: ViewParameters,
    ) -> Self {
        let inner = SessionInner {
            state: SessionState::new(view),
            history: history.list(),
            next_request: 0,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            feed,
            history,
            analytics,
        }
    }

    /// Wire up feed, file-backed history and analytics from configuration
    pub fn from_config(config: &Config) -> FeedResult<Self> {
        let feed = PhotoFeedClient::from_config(&config.feed)?;
        let history = SearchHistoryStore::new(
            Arc::new(FileStore::new(&config.history.dir)),
            config.history.storage_key.clone(),
        );
        let analytics = AnalyticsTracker::new(config.analytics.enabled);

        Ok(Self::new(
            feed,
            history,
            analytics,
            ViewParameters::with_page_size(config.view.page_size),
        ))
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn snapshot_of(inner: &SessionInner) -> SessionSnapshot {
        SessionSnapshot {
            status: inner.state.status,
            last_query: inner.state.last_query.clone(),
            view: inner.state.view,
            projected_view: inner.state.projection.clone(),
            history: inner.history.clone(),
            error_message: inner.state.error_message.clone(),
            result_count: inner.state.results.len(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        Self::snapshot_of(&self.lock())
    }

    pub fn feed(&self) -> &PhotoFeedClient {
        &self.feed
    }

    pub fn analytics(&self) -> &AnalyticsTracker {
        &self.analytics
    }

    /// Run a search for `term`
    ///
    /// Blank terms leave the session untouched and make no request. If a
    /// newer search starts while this one is in flight, this one's outcome
    /// is dropped and the returned snapshot reflects the newer search.
    pub async fn search(&self, term: &str) -> SessionSnapshot {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("Ignoring blank search term");
            return self.snapshot();
        }

        let request_id = {
            let mut inner = self.lock();
            inner.next_request += 1;
            let request_id = inner.next_request;
            let state = std::mem::take(&mut inner.state);
            inner.state = state.apply(SessionEvent::SearchStarted {
                term: term.to_string(),
                request_id,
            });
            request_id
        };

        self.analytics.track_search(term);
        tracing::info!("Searching photos for '{}' (request {})", term, request_id);

        let outcome = self.feed.fetch(term).await;

        let mut inner = self.lock();
        if !inner.state.is_current(request_id) {
            tracing::debug!("Discarding superseded result for '{}' (request {})", term, request_id);
            return Self::snapshot_of(&inner);
        }

        let event = match outcome {
            Ok(results) => {
                tracing::info!("Found {} photos for '{}'", results.len(), term);
                match self.history.record(term) {
                    Ok(()) => inner.history = self.history.list(),
                    Err(e) => tracing::warn!("Failed to save search history: {}", e),
                }
                SessionEvent::SearchSucceeded {
                    request_id,
                    results,
                }
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Failed to fetch photos for '{}': {}", term, e);
                SessionEvent::SearchFailed {
                    request_id,
                    message: FETCH_ERROR_MESSAGE.to_string(),
                }
            }
        };

        let state = std::mem::take(&mut inner.state);
        inner.state = state.apply(event);
        Self::snapshot_of(&inner)
    }

    /// Re-run a term picked from the history list
    pub async fn select_history_term(&self, term: &str) -> SessionSnapshot {
        self.search(term).await
    }

    /// Merge new view parameters and re-project; never fetches
    pub fn change_view(&self, patch: ViewPatch) -> SessionSnapshot {
        self.dispatch(SessionEvent::ViewChanged(patch))
    }

    /// Back to relevance order, no filter, first page
    pub fn reset_view(&self) -> SessionSnapshot {
        self.dispatch(SessionEvent::ViewReset)
    }

    fn dispatch(&self, event: SessionEvent) -> SessionSnapshot {
        let mut inner = self.lock();
        let state = std::mem::take(&mut inner.state);
        inner.state = state.apply(event);
        Self::snapshot_of(&inner)
    }

    /// Forget all history terms; current results are kept
    pub fn clear_history(&self) -> SessionSnapshot {
        if let Err(e) = self.history.clear() {
            tracing::warn!("Failed to clear search history: {}", e);
        }
        let mut inner = self.lock();
        inner.history = self.history.list();
        Self::snapshot_of(&inner)
    }

    /// Look up a record in the current results, counting it as opened
    pub fn photo(&self, id: &str) -> Option<PhotoRecord> {
        let record = self
            .lock()
            .state
            .results
            .iter()
            .find(|r| r.id == id)
            .cloned()?;
        self.analytics.track_photo_click(&record.id, &record.title);
        Some(record)
    }
}
