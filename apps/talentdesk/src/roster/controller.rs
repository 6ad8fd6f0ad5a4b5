//! Roster controller: one paged candidate view with search and filters.
//!
//! Ordering rule: every issued query takes a new generation number, and a
//! response is applied only if its generation is still the latest. Responses
//! to superseded queries are dropped on arrival, whatever order the network
//! delivers them in. State lives behind a mutex that is never held across an
//! await, so completion handlers cannot interleave mid-update.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api_client::{CandidateSource, RequestGuard};
use crate::errors::Result;
use crate::models::{
    Candidate, CandidateStatus, CandidateUpdate, NewCandidate, ResumeFile, RosterPage, RosterQuery,
    Scope,
};
use crate::roster::mutations::{require_id, Mutator};

/// Search keystrokes are coalesced over this quiet period.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    pub page_size: u32,
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// How an issued query ended for its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The page is now displayed.
    Applied(RosterPage),
    /// A newer query was issued first; this one's result was discarded.
    Superseded,
}

impl QueryOutcome {
    pub fn page(self) -> Option<RosterPage> {
        match self {
            QueryOutcome::Applied(page) => Some(page),
            QueryOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, QueryOutcome::Superseded)
    }
}

/// What replacing a record did to a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateEffect {
    pub replaced: bool,
    /// The record entered or left the view's filter; its pages and counts are
    /// stale until the active query is re-issued.
    pub needs_resync: bool,
}

/// Read-only view state for the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterSnapshot {
    /// Query of the displayed page.
    pub query: Option<RosterQuery>,
    /// Search results while a search is active, otherwise the paged view.
    pub page: Option<RosterPage>,
    pub searching: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// The latest issued query, until it settles.
#[derive(Debug, Clone)]
struct PendingQuery {
    query: RosterQuery,
    /// False while a search is still waiting out the debounce period.
    sent: bool,
}

#[derive(Debug, Default)]
struct ViewState {
    generation: u64,
    /// Query of the displayed page. Set only when a fetch is applied.
    active: Option<RosterQuery>,
    pending: Option<PendingQuery>,
    /// Last applied query without a search term.
    browse_query: Option<RosterQuery>,
    /// Trimmed search term, pending or active.
    search_term: String,
    browse: Option<RosterPage>,
    search: Option<RosterPage>,
    loading: bool,
    error: Option<String>,
}

pub struct RosterController {
    name: String,
    scope: Scope,
    source: Arc<dyn CandidateSource>,
    guard: RequestGuard,
    config: RosterConfig,
    state: Mutex<ViewState>,
}

impl RosterController {
    pub fn new(
        name: impl Into<String>,
        scope: Scope,
        source: Arc<dyn CandidateSource>,
        guard: RequestGuard,
        config: RosterConfig,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            source,
            guard,
            config,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scope this view was created for.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Loads the first page of the view's own scope.
    pub async fn open(&self) -> Result<QueryOutcome> {
        self.fetch_page(RosterQuery::new(self.scope.clone())).await
    }

    /// Moves the view to `query`.
    ///
    /// A changed search term waits out the debounce period first; any other
    /// change is fetched at once. Clearing the search returns to the page the
    /// user was browsing before the search started.
    pub async fn set_query(&self, query: RosterQuery) -> Result<QueryOutcome> {
        query.validate()?;

        let (generation, resolved, debounce) = {
            let mut state = self.lock();
            state.generation += 1;
            state.loading = true;
            let term = query.search_term().to_string();
            let previous = std::mem::replace(&mut state.search_term, term.clone());

            let (resolved, debounce) = if term.is_empty() {
                state.search = None;
                let resolved = match &state.browse_query {
                    Some(browse)
                        if !previous.is_empty()
                            && browse.scope == query.scope
                            && browse.status == query.status =>
                    {
                        browse.clone()
                    }
                    _ => query.without_search(),
                };
                (resolved, false)
            } else {
                (query, term != previous)
            };
            state.pending = Some(PendingQuery {
                query: resolved.clone(),
                sent: false,
            });
            (state.generation, resolved, debounce)
        };

        if debounce {
            debug!(
                "[{}] search '{}' waiting {}ms",
                self.name,
                resolved.search_term(),
                self.config.debounce.as_millis()
            );
            tokio::time::sleep(self.config.debounce).await;
            if !self.is_current(generation) {
                debug!("[{}] search '{}' coalesced", self.name, resolved.search_term());
                return Ok(QueryOutcome::Superseded);
            }
        }

        self.resolve(generation, resolved).await
    }

    /// Fetches `query` immediately, with no debounce.
    pub async fn fetch_page(&self, query: RosterQuery) -> Result<QueryOutcome> {
        query.validate()?;
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.loading = true;
            state.search_term = query.search_term().to_string();
            if !query.is_search() {
                state.search = None;
            }
            state.pending = Some(PendingQuery {
                query: query.clone(),
                sent: false,
            });
            state.generation
        };
        self.resolve(generation, query).await
    }

    /// Query a resync should re-issue so the view catches up with the backend.
    ///
    /// A sent but unsettled query is re-issued as is, so the user's latest
    /// request still wins. A search still waiting out its debounce will be
    /// fetched after the write anyway, so nothing is re-issued. Otherwise the
    /// displayed page's query, never a query that failed.
    fn resync_target(&self, first_page: bool) -> Option<RosterQuery> {
        let state = self.lock();
        match &state.pending {
            Some(pending) if !pending.sent => None,
            Some(pending) => Some(pending.query.clone()),
            None => state
                .active
                .clone()
                .map(|q| if first_page { q.page(1) } else { q }),
        }
    }

    /// Re-fetches the view. `None` when there is nothing to re-issue: no page
    /// was ever displayed, or a debounced search is about to be fetched.
    pub async fn refresh(&self) -> Result<Option<QueryOutcome>> {
        match self.resync_target(false) {
            Some(query) => self.fetch_page(query).await.map(Some),
            None => Ok(None),
        }
    }

    /// Like `refresh`, but goes back to page 1 of the displayed query,
    /// keeping its search and filter.
    pub async fn reload_first_page(&self) -> Result<Option<QueryOutcome>> {
        match self.resync_target(true) {
            Some(query) => self.fetch_page(query).await.map(Some),
            None => Ok(None),
        }
    }

    async fn resolve(&self, generation: u64, query: RosterQuery) -> Result<QueryOutcome> {
        {
            let mut state = self.lock();
            if state.generation != generation {
                return Ok(QueryOutcome::Superseded);
            }
            state.pending = Some(PendingQuery {
                query: query.clone(),
                sent: true,
            });
        }

        debug!(
            "[{}] fetching scope={} page={} search='{}' (gen {})",
            self.name,
            query.scope,
            query.page,
            query.search_term(),
            generation
        );
        let result = self
            .guard
            .run(
                "roster fetch",
                self.source.fetch_page(&query, self.config.page_size),
            )
            .await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                "[{}] discarding stale response for page {} (gen {} < {})",
                self.name, query.page, generation, state.generation
            );
            return Ok(QueryOutcome::Superseded);
        }
        state.loading = false;
        state.pending = None;

        match result {
            Ok(page) => {
                info!(
                    "[{}] page {}/{} applied ({} of {} candidates)",
                    self.name,
                    page.current_page,
                    page.total_pages,
                    page.candidates.len(),
                    page.total_candidates
                );
                state.error = None;
                state.active = Some(query.clone());
                if query.is_search() {
                    state.search = Some(page.clone());
                } else {
                    state.browse = Some(page.clone());
                    state.browse_query = Some(query);
                    state.search = None;
                }
                Ok(QueryOutcome::Applied(page))
            }
            Err(e) => {
                // The previous page stays on screen.
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        let state = self.lock();
        let searching = !state.search_term.is_empty();
        let page = if searching {
            state.search.clone().or_else(|| state.browse.clone())
        } else {
            state.browse.clone()
        };
        RosterSnapshot {
            query: state.active.clone(),
            page,
            searching,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// The held record with this id, searching results first.
    pub fn find(&self, candidate_id: &str) -> Option<Candidate> {
        let state = self.lock();
        let found = [state.search.as_ref(), state.browse.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|page| page.get(candidate_id).cloned());
        found
    }

    /// Replaces the record with the same id in every held page.
    pub fn apply_update(&self, candidate: &Candidate) -> UpdateEffect {
        let mut guard = self.lock();
        let state = &mut *guard;
        let mut replaced = false;
        for page in [state.browse.as_mut(), state.search.as_mut()]
            .into_iter()
            .flatten()
        {
            replaced |= page.replace(candidate);
        }

        let needs_resync = state.active.as_ref().map_or(false, |query| {
            let admitted = query.admits(candidate);
            (replaced && !admitted)
                || (!replaced && admitted && query.effective_status().is_some())
        });

        if replaced || needs_resync {
            debug!(
                "[{}] candidate {} replaced={} resync={}",
                self.name, candidate.id, replaced, needs_resync
            );
        }
        UpdateEffect {
            replaced,
            needs_resync,
        }
    }

    /// Whether a newly created record lands in the scope on screen, or in the
    /// scope of the query the user is waiting for.
    pub fn accepts_new(&self, candidate: &Candidate) -> bool {
        let state = self.lock();
        state
            .pending
            .as_ref()
            .map(|p| &p.query)
            .or(state.active.as_ref())
            .map_or(&self.scope, |q| &q.scope)
            .contains(candidate)
    }

    /// Replaces locally, then resyncs if the record moved across the displayed
    /// page's filter. A failed resync is reported in the snapshot.
    pub(crate) async fn absorb(&self, candidate: &Candidate) {
        if self.apply_update(candidate).needs_resync {
            if let Err(e) = self.refresh().await {
                warn!("[{}] resync after update failed: {e}", self.name);
            }
        }
    }

    fn mutator(&self) -> Mutator<'_> {
        Mutator {
            source: self.source.as_ref(),
            guard: &self.guard,
        }
    }

    pub async fn update_candidate_status(
        &self,
        candidate_id: &str,
        status: CandidateStatus,
    ) -> Result<Candidate> {
        let updated = self.mutator().status(candidate_id, status).await?;
        self.absorb(&updated).await;
        Ok(updated)
    }

    /// `Ok(None)` when the trimmed remarks equal the held ones; no request is sent.
    pub async fn update_candidate_remarks(
        &self,
        candidate_id: &str,
        remarks: &str,
    ) -> Result<Option<Candidate>> {
        let id = require_id(candidate_id)?;
        let remarks = remarks.trim();
        if let Some(current) = self.find(id) {
            if current.remarks().trim() == remarks {
                debug!("[{}] remarks for {id} unchanged", self.name);
                return Ok(None);
            }
        }
        let updated = self.mutator().remarks(id, remarks).await?;
        self.absorb(&updated).await;
        Ok(Some(updated))
    }

    pub async fn update_candidate(
        &self,
        candidate_id: &str,
        update: &CandidateUpdate,
    ) -> Result<Candidate> {
        let updated = self.mutator().edit(candidate_id, update).await?;
        self.absorb(&updated).await;
        Ok(updated)
    }

    /// Creates a candidate, then re-fetches page 1 so server-assigned fields
    /// and counts come from the backend.
    pub async fn add_candidate(
        &self,
        new: &NewCandidate,
        resume: Option<&ResumeFile>,
    ) -> Result<Candidate> {
        let created = self.mutator().create(new, resume).await?;
        if self.accepts_new(&created) {
            if let Err(e) = self.reload_first_page().await {
                warn!("[{}] reload after create failed: {e}", self.name);
            }
        }
        Ok(created)
    }

    /// Cancels in-flight requests; later calls fail with `Cancelled`.
    pub fn shutdown(&self) {
        info!("[{}] shutting down", self.name);
        self.guard.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.guard.is_cancelled()
    }
}

impl std::fmt::Debug for RosterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterController")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
