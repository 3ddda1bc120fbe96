//! Lazy ("load more") pagination for scroll-driven lists.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::models::{PageResult, FIRST_PAGE};
use super::source::PageSource;
use crate::api::ApiError;

/// What a call to [`InfiniteList::fetch_next_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and appended.
    Appended,
    /// No request was made: a fetch is already in flight, or no page remains.
    Skipped,
    /// The response arrived after the query changed and was dropped.
    Discarded,
    /// The server answered with something unreadable; the list is closed.
    EndOfData,
}

/// Read-only view of an [`InfiniteList`] for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteSnapshot<T> {
    /// Items of every fetched page, in page order
    pub items: Vec<T>,
    pub has_next_page: bool,
    /// First page in flight, nothing to show yet
    pub is_loading: bool,
    /// A later page in flight
    pub is_fetching_next_page: bool,
    pub page_count: usize,
}

struct ListState<Q, T> {
    query: Q,
    /// Bumped on every reset; responses carry the generation they were
    /// requested under.
    generation: u64,
    pages: Vec<PageResult<T>>,
    next_page: Option<u32>,
    in_flight: bool,
}

impl<Q, T> ListState<Q, T> {
    fn reset(&mut self, ready: bool) {
        self.generation += 1;
        self.pages.clear();
        self.next_page = ready.then_some(FIRST_PAGE);
        self.in_flight = false;
    }
}

fn lock_state<Q, T>(state: &Mutex<ListState<Q, T>>) -> MutexGuard<'_, ListState<Q, T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the in-flight slot if a fetch is dropped before it completes.
struct InFlightGuard<'a, Q, T> {
    state: &'a Mutex<ListState<Q, T>>,
    generation: u64,
    armed: bool,
}

impl<Q, T> InFlightGuard<'_, Q, T> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<Q, T> Drop for InFlightGuard<'_, Q, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock_state(self.state);
        if state.generation == self.generation {
            state.in_flight = false;
        }
    }
}

/// A cursor over a paged list that grows one page per trigger.
///
/// At most one fetch is in flight; triggers received meanwhile are ignored.
/// Changing the query drops fetched pages and any response still pending for
/// the old query.
pub struct InfiniteList<S: PageSource> {
    source: S,
    state: Mutex<ListState<S::Query, S::Item>>,
}

impl<S: PageSource> InfiniteList<S> {
    pub fn new(source: S, query: S::Query) -> Self {
        let ready = source.is_ready(&query);
        Self {
            source,
            state: Mutex::new(ListState {
                query,
                generation: 0,
                pages: Vec::new(),
                next_page: ready.then_some(FIRST_PAGE),
                in_flight: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState<S::Query, S::Item>> {
        lock_state(&self.state)
    }

    pub fn query(&self) -> S::Query {
        self.lock().query.clone()
    }

    /// Fetches the page under the cursor and appends it.
    ///
    /// The first call loads page 1. On a transport or status failure the
    /// cursor stays put so the caller can retry. Dropping the returned future
    /// mid-request frees the slot for the next trigger.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, ApiError> {
        let (query, page, generation) = {
            let mut state = self.lock();
            let Some(page) = state.next_page else {
                return Ok(FetchOutcome::Skipped);
            };
            if state.in_flight {
                return Ok(FetchOutcome::Skipped);
            }
            state.in_flight = true;
            (state.query.clone(), page, state.generation)
        };
        let mut guard = InFlightGuard {
            state: &self.state,
            generation,
            armed: true,
        };

        let result = self.source.fetch_page(&query, page).await;

        let mut state = self.lock();
        guard.disarm();
        if state.generation != generation {
            tracing::debug!(?query, page, "Discarding response for superseded query");
            return Ok(FetchOutcome::Discarded);
        }
        state.in_flight = false;

        match result {
            Ok(fetched) => {
                state.next_page = fetched.has_next_page().then_some(page + 1);
                state.pages.push(fetched);
                Ok(FetchOutcome::Appended)
            }
            Err(e) if e.is_malformed() => {
                tracing::warn!(?query, page, "Closing list after malformed page: {}", e);
                state.next_page = None;
                Ok(FetchOutcome::EndOfData)
            }
            Err(e) => Err(e),
        }
    }

    /// Switches to a new filter tuple. A no-op if the query is unchanged.
    pub fn set_query(&self, query: S::Query) {
        let ready = self.source.is_ready(&query);
        let mut state = self.lock();
        if state.query == query {
            return;
        }
        state.query = query;
        state.reset(ready);
    }

    /// Drops every fetched page; the next trigger starts over at page 1.
    pub fn refetch(&self) {
        let mut state = self.lock();
        let ready = self.source.is_ready(&state.query);
        state.reset(ready);
    }

    pub fn has_next_page(&self) -> bool {
        let state = self.lock();
        !state.pages.is_empty() && state.next_page.is_some()
    }

    pub fn snapshot(&self) -> InfiniteSnapshot<S::Item> {
        let state = self.lock();
        InfiniteSnapshot {
            items: state
                .pages
                .iter()
                .flat_map(|p| p.items.iter().cloned())
                .collect(),
            has_next_page: !state.pages.is_empty() && state.next_page.is_some(),
            is_loading: state.in_flight && state.pages.is_empty(),
            is_fetching_next_page: state.in_flight && !state.pages.is_empty(),
            page_count: state.pages.len(),
        }
    }
}
