//! Search session state machine.
//!
//! Owns the query, the page cursor, the results accumulated across pages
//! and the client-side filters. Lookups go through [`LocalCatalogApi`].
//!
//! Every lookup is split in two halves: [`SearchSession::begin_search`]
//! enters the searching state and hands out a [`SearchTicket`], and
//! [`SearchSession::complete_search`] applies the outcome. Only the most
//! recent ticket is honoured, so when requests overlap the last one wins
//! and earlier outcomes are dropped.

#![allow(clippy::future_not_send)]

use std::collections::HashSet;

use reelscout_api::omdb::{CatalogError, LocalCatalogApi, MovieKind, MovieSummary, SearchPage};
use tracing::instrument;

/// Number of hits the catalog returns per page.
pub const PAGE_SIZE: u32 = 10;

/// Number of pages needed to hold `total_results` hits.
#[must_use]
pub const fn total_pages_for(total_results: u32) -> u32 {
    total_results.div_ceil(PAGE_SIZE)
}

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing searched yet.
    Idle,
    /// A lookup is in flight.
    Searching,
    /// The last lookup succeeded (results may be empty).
    Results,
    /// The last lookup failed.
    Errored,
}

/// Handle for one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    page: u32,
}

impl SearchTicket {
    /// Page this lookup requests.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }
}

/// In-memory state of one search interaction.
#[derive(Debug, Clone)]
pub struct SearchSession {
    query: String,
    current_page: u32,
    results: Vec<MovieSummary>,
    total_results: u32,
    total_pages: u32,
    has_searched: bool,
    is_loading: bool,
    last_error: Option<String>,
    year_filter: String,
    type_filter: Option<MovieKind>,
    /// Bumped by every new lookup and by `clear_search`.
    generation: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    /// Creates an idle session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            query: String::new(),
            current_page: 1,
            results: Vec::new(),
            total_results: 0,
            total_pages: 0,
            has_searched: false,
            is_loading: false,
            last_error: None,
            year_filter: String::new(),
            type_filter: None,
            generation: 0,
        }
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Page of the most recent lookup (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Results accumulated across completed page fetches, in arrival order.
    #[must_use]
    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    /// Total hits reported by the catalog for the query (not the filtered subset).
    #[must_use]
    pub const fn total_results(&self) -> u32 {
        self.total_results
    }

    /// `ceil(total_results / PAGE_SIZE)`.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether any lookup has been started since the last reset.
    #[must_use]
    pub const fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// Whether a lookup is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed lookup.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Year filter; empty means no filter.
    #[must_use]
    pub fn year_filter(&self) -> &str {
        &self.year_filter
    }

    /// Type filter; `None` means no filter.
    #[must_use]
    pub const fn type_filter(&self) -> Option<MovieKind> {
        self.type_filter
    }

    /// Derived coarse state.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Searching
        } else if !self.has_searched {
            SessionPhase::Idle
        } else if self.last_error.is_some() {
            SessionPhase::Errored
        } else {
            SessionPhase::Results
        }
    }

    /// Whether another page exists beyond the current one.
    #[must_use]
    pub const fn can_load_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether either filter is set.
    #[must_use]
    pub const fn has_active_filters(&self) -> bool {
        !self.year_filter.is_empty() || self.type_filter.is_some()
    }

    /// Whether `ticket` is the most recent lookup.
    #[must_use]
    pub const fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Enters the searching state for `query` at `page` and returns the
    /// ticket the outcome must be reported with. Pages below 1 become 1.
    pub fn begin_search(&mut self, query: impl Into<String>, page: u32) -> SearchTicket {
        let page = page.max(1);

        self.generation = self.generation.wrapping_add(1);
        self.query = query.into();
        self.current_page = page;
        self.has_searched = true;
        self.is_loading = true;
        self.last_error = None;

        SearchTicket {
            generation: self.generation,
            page,
        }
    }

    /// Applies the outcome of the lookup identified by `ticket`.
    ///
    /// Page 1 replaces the accumulated results, later pages append to them.
    /// A failed page 1 discards everything; a failed later page keeps what
    /// was already loaded. The cursor stays on the requested page either way.
    ///
    /// Returns `false` (and changes nothing) when `ticket` was superseded.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<SearchPage, CatalogError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(page = ticket.page, "discarding superseded search outcome");
            return false;
        }

        self.is_loading = false;
        match outcome {
            Ok(page) => {
                tracing::debug!(
                    page = ticket.page,
                    items = page.items.len(),
                    total = page.total_count,
                    "search page applied"
                );
                if ticket.page == 1 {
                    self.results = page.items;
                } else {
                    self.results.extend(page.items);
                }
                self.total_results = page.total_count;
                self.total_pages = total_pages_for(page.total_count);
            }
            Err(err) => {
                tracing::debug!(page = ticket.page, error = %err, "search failed");
                self.last_error = Some(err.to_string());
                if ticket.page == 1 {
                    self.results.clear();
                    self.total_results = 0;
                    self.total_pages = 0;
                }
            }
        }
        true
    }

    /// Ticket for the next page, or `None` when there is no next page.
    pub fn begin_load_more(&mut self) -> Option<SearchTicket> {
        if !self.can_load_more() {
            return None;
        }
        let query = self.query.clone();
        let next = self.current_page.saturating_add(1);
        Some(self.begin_search(query, next))
    }

    /// Ticket for `page` of the current query. Page 1 replaces the results.
    pub fn begin_go_to_page(&mut self, page: u32) -> SearchTicket {
        let query = self.query.clone();
        self.begin_search(query, page)
    }

    /// Runs a lookup for `query` at `page` to completion.
    #[instrument(skip_all, fields(page = page))]
    pub async fn start_search(
        &mut self,
        api: &impl LocalCatalogApi,
        query: impl Into<String>,
        page: u32,
    ) {
        let ticket = self.begin_search(query, page);
        self.run(api, ticket).await;
    }

    /// Fetches the next page and appends it. Returns `false` without any
    /// request when the current page is already the last one.
    #[instrument(skip_all)]
    pub async fn load_more(&mut self, api: &impl LocalCatalogApi) -> bool {
        let Some(ticket) = self.begin_load_more() else {
            return false;
        };
        self.run(api, ticket).await;
        true
    }

    /// Re-runs the current query at `page`.
    #[instrument(skip_all, fields(page = page))]
    pub async fn go_to_page(&mut self, api: &impl LocalCatalogApi, page: u32) {
        let ticket = self.begin_go_to_page(page);
        self.run(api, ticket).await;
    }

    async fn run(&mut self, api: &impl LocalCatalogApi, ticket: SearchTicket) {
        let outcome = api.search(&self.query, ticket.page).await;
        self.complete_search(ticket, outcome);
    }

    /// Sets both filters. Never fetches and never touches results or paging.
    pub fn set_filters(&mut self, year: impl Into<String>, kind: Option<MovieKind>) {
        self.year_filter = year.into();
        self.type_filter = kind;
    }

    /// Clears both filters.
    pub fn clear_filters(&mut self) {
        self.year_filter.clear();
        self.type_filter = None;
    }

    /// Resets to the initial state. In-flight lookups are superseded.
    pub fn clear_search(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::new()
        };
    }

    /// Accumulated results passing both filters. Recomputed on every call.
    #[must_use]
    pub fn visible_results(&self) -> Vec<&MovieSummary> {
        self.results
            .iter()
            .filter(|m| self.year_filter.is_empty() || m.year == self.year_filter)
            .filter(|m| self.type_filter.is_none_or(|kind| m.kind == kind))
            .collect()
    }

    /// Distinct years across the accumulated results, newest first.
    /// Years without a leading number sort last.
    #[must_use]
    pub fn available_years(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut years: Vec<(Option<u32>, &str)> = self
            .results
            .iter()
            .filter(|m| seen.insert(m.year.as_str()))
            .map(|m| (m.start_year(), m.year.as_str()))
            .collect();
        years.sort_by(|a, b| b.0.cmp(&a.0));
        years.into_iter().map(|(_, y)| String::from(y)).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashMap;
    use std::sync::Mutex;

    use reelscout_api::omdb::{MovieDetail, POSTER_UNAVAILABLE};

    use super::*;

    /// Catalog returning scripted pages and recording every call.
    struct MockCatalog {
        pages: Mutex<HashMap<(String, u32), Result<SearchPage, CatalogError>>>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockCatalog {
        fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_page(
            self,
            query: &str,
            page: u32,
            outcome: Result<SearchPage, CatalogError>,
        ) -> Self {
            self.script(query, page, outcome);
            self
        }

        fn script(&self, query: &str, page: u32, outcome: Result<SearchPage, CatalogError>) {
            self.pages
                .lock()
                .unwrap()
                .insert((String::from(query), page), outcome);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> Option<(String, u32)> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    impl LocalCatalogApi for MockCatalog {
        async fn search(&self, title: &str, page: u32) -> Result<SearchPage, CatalogError> {
            self.calls.lock().unwrap().push((String::from(title), page));
            self.pages
                .lock()
                .unwrap()
                .get(&(String::from(title), page))
                .cloned()
                .unwrap_or_else(|| Err(CatalogError::Rejected(String::from("Movie not found!"))))
        }

        async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, CatalogError> {
            Err(CatalogError::NotFound(format!("{id} not found")))
        }
    }

    fn movie(id: &str, year: &str, kind: MovieKind) -> MovieSummary {
        MovieSummary {
            id: String::from(id),
            title: format!("Title {id}"),
            year: String::from(year),
            kind,
            poster: String::from(POSTER_UNAVAILABLE),
        }
    }

    /// A full page of ten movies with ids `{prefix}0`..`{prefix}9`.
    fn page_of(prefix: &str, total: u32) -> Result<SearchPage, CatalogError> {
        let items = (0..10)
            .map(|i| movie(&format!("{prefix}{i}"), "2005", MovieKind::Movie))
            .collect();
        Ok(SearchPage {
            items,
            total_count: total,
        })
    }

    fn batman_catalog() -> MockCatalog {
        MockCatalog::new()
            .with_page("batman", 1, page_of("p1-", 57))
            .with_page("batman", 2, page_of("p2-", 57))
            .with_page("batman", 3, page_of("p3-", 57))
    }

    #[test]
    fn test_initial_state_is_idle() {
        // Arrange & Act
        let session = SearchSession::new();

        // Assert
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.current_page(), 1);
        assert!(session.results().is_empty());
        assert_eq!(session.total_pages(), 0);
        assert!(!session.can_load_more());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        // Arrange & Act & Assert
        assert_eq!(total_pages_for(0), 0);
        assert_eq!(total_pages_for(1), 1);
        assert_eq!(total_pages_for(10), 1);
        assert_eq!(total_pages_for(57), 6);
    }

    #[test]
    fn test_begin_search_enters_searching_and_clears_error() {
        // Arrange
        let mut session = SearchSession::new();
        let ticket = session.begin_search("x", 1);
        session.complete_search(ticket, Err(CatalogError::Transport(String::from("down"))));
        assert_eq!(session.phase(), SessionPhase::Errored);

        // Act
        session.begin_search("x", 1);

        // Assert
        assert_eq!(session.phase(), SessionPhase::Searching);
        assert!(session.is_loading());
        assert!(session.last_error().is_none());
        assert!(session.has_searched());
    }

    #[test]
    fn test_begin_search_normalizes_page_zero() {
        // Arrange
        let mut session = SearchSession::new();

        // Act
        let ticket = session.begin_search("x", 0);

        // Assert
        assert_eq!(ticket.page(), 1);
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn test_second_page_appends_in_arrival_order() {
        // Arrange
        let api = batman_catalog();
        let mut session = SearchSession::new();

        // Act
        session.start_search(&api, "batman", 1).await;
        session.start_search(&api, "batman", 2).await;

        // Assert
        let ids: Vec<&str> = session.results().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], "p1-0");
        assert_eq!(ids[9], "p1-9");
        assert_eq!(ids[10], "p2-0");
        assert_eq!(ids[19], "p2-9");
    }

    #[tokio::test]
    async fn test_load_more_versus_go_to_page_one() {
        // Arrange
        let api = batman_catalog();
        let mut session = SearchSession::new();

        // Act: page 1
        session.start_search(&api, "batman", 1).await;

        // Assert
        assert_eq!(session.results().len(), 10);
        assert_eq!(session.total_results(), 57);
        assert_eq!(session.total_pages(), 6);
        assert_eq!(session.current_page(), 1);

        // Act: load more issues page 2 and appends
        let issued = session.load_more(&api).await;

        // Assert
        assert!(issued);
        assert_eq!(api.last_call(), Some((String::from("batman"), 2)));
        assert_eq!(session.results().len(), 20);
        assert_eq!(session.current_page(), 2);

        // Act: go to page 1 replaces
        session.go_to_page(&api, 1).await;

        // Assert
        assert_eq!(session.results().len(), 10);
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.phase(), SessionPhase::Results);
    }

    #[tokio::test]
    async fn test_load_more_on_last_page_is_noop() {
        // Arrange
        let single = Ok(SearchPage {
            items: vec![movie("tt1", "1994", MovieKind::Movie)],
            total_count: 1,
        });
        let api = MockCatalog::new().with_page("shawshank", 1, single);
        let mut session = SearchSession::new();
        session.start_search(&api, "shawshank", 1).await;
        let before = session.clone();

        // Act
        let issued = session.load_more(&api).await;

        // Assert
        assert!(!issued);
        assert_eq!(api.call_count(), 1);
        assert_eq!(session.current_page(), before.current_page());
        assert_eq!(session.results(), before.results());
        assert_eq!(session.phase(), before.phase());
    }

    #[tokio::test]
    async fn test_first_page_failure_discards_state() {
        // Arrange
        let api = MockCatalog::new().with_page("batman", 1, page_of("p1-", 57));
        let mut session = SearchSession::new();
        session.start_search(&api, "batman", 1).await;

        // Act
        session.start_search(&api, "zzqqzz", 1).await;

        // Assert
        assert!(session.results().is_empty());
        assert_eq!(session.total_results(), 0);
        assert_eq!(session.total_pages(), 0);
        assert_eq!(session.last_error(), Some("Movie not found!"));
        assert_eq!(session.phase(), SessionPhase::Errored);
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_loaded_results() {
        // Arrange
        let api = MockCatalog::new()
            .with_page("batman", 1, page_of("p1-", 57))
            .with_page(
                "batman",
                2,
                Err(CatalogError::Transport(String::from("connection reset"))),
            );
        let mut session = SearchSession::new();
        session.start_search(&api, "batman", 1).await;
        let page_one = session.results().to_vec();

        // Act
        let issued = session.load_more(&api).await;

        // Assert
        assert!(issued);
        assert_eq!(session.results(), page_one.as_slice());
        assert_eq!(session.total_results(), 57);
        assert_eq!(session.total_pages(), 6);
        assert_eq!(session.last_error(), Some("connection reset"));
        assert_eq!(session.current_page(), 2);
        assert_eq!(session.phase(), SessionPhase::Errored);
    }

    #[test]
    fn test_failed_later_page_keeps_requested_page() {
        // Arrange
        let mut session = SearchSession::new();
        let first = session.begin_search("batman", 1);
        session.complete_search(first, page_of("p1-", 57));
        let second = session.begin_search("batman", 2);

        // Act
        session.complete_search(
            second,
            Err(CatalogError::Transport(String::from("timeout"))),
        );

        // Assert
        assert_eq!(session.current_page(), 2);
        assert_eq!(session.results().len(), 10);
        assert_eq!(session.total_pages(), 6);
        assert!(session.can_load_more());
    }

    #[tokio::test]
    async fn test_go_to_failed_page_retries_it() {
        // Arrange
        let api = MockCatalog::new()
            .with_page("batman", 1, page_of("p1-", 57))
            .with_page(
                "batman",
                2,
                Err(CatalogError::Transport(String::from("timeout"))),
            );
        let mut session = SearchSession::new();
        session.start_search(&api, "batman", 1).await;
        session.load_more(&api).await;
        api.script("batman", 2, page_of("p2-", 57));

        // Act
        session.go_to_page(&api, 2).await;

        // Assert
        assert_eq!(api.last_call(), Some((String::from("batman"), 2)));
        assert_eq!(session.results().len(), 20);
        assert_eq!(session.current_page(), 2);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_empty_query_is_delegated_to_catalog() {
        // Arrange
        let api = MockCatalog::new().with_page(
            "",
            1,
            Err(CatalogError::Rejected(String::from("Incorrect IMDb ID."))),
        );
        let mut session = SearchSession::new();

        // Act
        session.start_search(&api, "", 1).await;

        // Assert
        assert_eq!(api.last_call(), Some((String::new(), 1)));
        assert_eq!(session.last_error(), Some("Incorrect IMDb ID."));
    }

    #[test]
    fn test_superseded_outcome_is_ignored() {
        // Arrange
        let mut session = SearchSession::new();
        let first = session.begin_search("batman", 1);
        let second = session.begin_search("superman", 1);

        // Act
        let applied_second = session.complete_search(second, page_of("s-", 12));
        let applied_first = session.complete_search(first, page_of("b-", 57));

        // Assert
        assert!(applied_second);
        assert!(!applied_first);
        assert_eq!(session.query(), "superman");
        assert_eq!(session.total_results(), 12);
        assert_eq!(session.results()[0].id, "s-0");
        assert!(!session.is_loading());
    }

    #[test]
    fn test_late_outcome_while_newer_in_flight_keeps_loading() {
        // Arrange
        let mut session = SearchSession::new();
        let first = session.begin_search("batman", 1);
        let _second = session.begin_search("batman", 2);

        // Act
        let applied = session.complete_search(first, page_of("b-", 57));

        // Assert
        assert!(!applied);
        assert!(session.is_loading());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_clear_search_resets_and_supersedes() {
        // Arrange
        let mut session = SearchSession::new();
        let done = session.begin_search("batman", 1);
        session.complete_search(done, page_of("b-", 57));
        session.set_filters("2005", Some(MovieKind::Movie));
        let in_flight = session.begin_load_more().unwrap();

        // Act
        session.clear_search();
        let applied = session.complete_search(in_flight, page_of("late-", 57));

        // Assert
        assert!(!applied);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.results().is_empty());
        assert_eq!(session.query(), "");
        assert_eq!(session.current_page(), 1);
        assert!(!session.has_active_filters());
    }

    fn filter_fixture() -> SearchSession {
        let mut session = SearchSession::new();
        let ticket = session.begin_search("shawshank", 1);
        session.complete_search(
            ticket,
            Ok(SearchPage {
                items: vec![
                    movie("tt1", "1994", MovieKind::Movie),
                    movie("tt2", "1994", MovieKind::Series),
                    movie("tt3", "2004", MovieKind::Movie),
                    movie("tt4", "2008–2013", MovieKind::Series),
                ],
                total_count: 4,
            }),
        );
        session
    }

    #[test]
    fn test_filters_year_and_type() {
        // Arrange
        let mut session = filter_fixture();

        // Act
        session.set_filters("1994", Some(MovieKind::Movie));

        // Assert
        let visible = session.visible_results();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "tt1");
        assert!(session.has_active_filters());
    }

    #[test]
    fn test_filters_never_touch_results_or_paging() {
        // Arrange
        let mut session = filter_fixture();
        let results = session.results().to_vec();

        // Act
        session.set_filters("2004", None);
        let filtered = session.visible_results().len();
        session.clear_filters();

        // Assert
        assert_eq!(filtered, 1);
        assert_eq!(session.results(), results.as_slice());
        assert_eq!(session.total_results(), 4);
        assert_eq!(session.current_page(), 1);
        let visible: Vec<MovieSummary> =
            session.visible_results().into_iter().cloned().collect();
        assert_eq!(visible, results);
    }

    #[test]
    fn test_type_filter_alone() {
        // Arrange
        let mut session = filter_fixture();

        // Act
        session.set_filters("", Some(MovieKind::Series));

        // Assert
        let ids: Vec<&str> = session
            .visible_results()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["tt2", "tt4"]);
    }

    #[test]
    fn test_available_years_distinct_descending() {
        // Arrange
        let mut session = filter_fixture();
        let ticket = session.begin_search("shawshank", 2);
        session.complete_search(
            ticket,
            Ok(SearchPage {
                items: vec![
                    movie("tt5", "N/A", MovieKind::Other),
                    movie("tt6", "2004", MovieKind::Movie),
                ],
                total_count: 12,
            }),
        );

        // Act
        let years = session.available_years();

        // Assert
        assert_eq!(years, vec!["2008–2013", "2004", "1994", "N/A"]);
    }
}
