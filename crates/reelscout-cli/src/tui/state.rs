//! Browser state management.

use ratatui::widgets::TableState;
use reelscout_api::omdb::{CatalogError, MovieDetail, MovieKind, MovieSummary, SearchPage};
use reelscout_core::{FavoritesStore, SearchSession, SearchTicket, Theme, ThemePreference};
use reelscout_db::KeyValueStore;

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Search results.
    List,
    /// One title, keyed by id.
    Detail,
    /// Saved favorites.
    Favorites,
}

/// Input mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Query text input mode.
    Query,
}

/// Contents of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// Nothing requested yet.
    Empty,
    /// Waiting for the record of this id.
    Loading(String),
    /// Record received.
    Loaded(Box<MovieDetail>),
    /// Lookup failed with this message.
    Failed(String),
}

/// Catalog request to run off the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Search page lookup.
    Search {
        /// Ticket returned by the session.
        ticket: SearchTicket,
        /// Query text.
        query: String,
    },
    /// Full record lookup.
    Detail {
        /// Catalog id.
        id: String,
    },
}

/// Finished catalog request.
#[derive(Debug)]
pub enum Outcome {
    /// Result of [`Request::Search`].
    Search {
        /// Ticket the request was issued with.
        ticket: SearchTicket,
        /// Page or error.
        result: Result<SearchPage, CatalogError>,
    },
    /// Result of [`Request::Detail`].
    Detail {
        /// Requested id.
        id: String,
        /// Record or error.
        result: Result<Box<MovieDetail>, CatalogError>,
    },
}

/// State for the browser TUI.
#[derive(Debug)]
pub struct BrowserState<S> {
    /// Search session driving the list view.
    pub session: SearchSession,
    /// Persisted favorites.
    pub favorites: FavoritesStore<S>,
    /// Persisted theme.
    pub theme: ThemePreference<S>,
    /// Current screen.
    pub view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Query being edited.
    pub query_input: String,
    /// Detail view contents.
    pub detail: DetailState,
    /// Table state for the results list.
    pub list_table_state: TableState,
    /// Table state for the favorites list.
    pub favorites_table_state: TableState,
    /// Screen to return to when leaving the detail view.
    detail_return: View,
}

impl<S: KeyValueStore> BrowserState<S> {
    /// Creates a new state in the list view.
    #[must_use]
    pub fn new(favorites: FavoritesStore<S>, theme: ThemePreference<S>) -> Self {
        Self {
            session: SearchSession::new(),
            favorites,
            theme,
            view: View::List,
            input_mode: InputMode::Normal,
            query_input: String::new(),
            detail: DetailState::Empty,
            list_table_state: TableState::default(),
            favorites_table_state: TableState::default(),
            detail_return: View::List,
        }
    }

    /// Active theme.
    #[must_use]
    pub const fn current_theme(&self) -> Theme {
        self.theme.get()
    }

    /// Switches theme and persists it.
    pub fn toggle_theme(&mut self) {
        self.theme.toggle();
    }

    /// Results visible under the current filters.
    #[must_use]
    pub fn visible_results(&self) -> Vec<&MovieSummary> {
        self.session.visible_results()
    }

    /// Starts a search for the edited query. Blank queries are ignored.
    pub fn submit_query(&mut self) -> Option<Request> {
        self.input_mode = InputMode::Normal;
        let query = self.query_input.trim();
        if query.is_empty() {
            return None;
        }
        let query = String::from(query);
        let ticket = self.session.begin_search(query.clone(), 1);
        self.view = View::List;
        self.list_table_state.select(None);
        Some(Request::Search { ticket, query })
    }

    /// Requests the next page, appending to the list.
    pub fn load_more(&mut self) -> Option<Request> {
        let ticket = self.session.begin_load_more()?;
        Some(self.search_request(ticket))
    }

    /// Reloads page 1, dropping the appended pages.
    pub fn first_page(&mut self) -> Option<Request> {
        if !self.session.has_searched() || self.session.current_page() <= 1 {
            return None;
        }
        let ticket = self.session.begin_go_to_page(1);
        self.list_table_state.select(None);
        Some(self.search_request(ticket))
    }

    fn search_request(&self, ticket: SearchTicket) -> Request {
        Request::Search {
            ticket,
            query: String::from(self.session.query()),
        }
    }

    /// Cycles the year filter through the available years, then back to none.
    pub fn cycle_year_filter(&mut self) {
        let years = self.session.available_years();
        let current = self.session.year_filter();
        let next = if current.is_empty() {
            years.first().cloned()
        } else {
            years
                .iter()
                .position(|y| y == current)
                .and_then(|i| years.get(i.saturating_add(1)))
                .cloned()
        };
        let kind = self.session.type_filter();
        self.session.set_filters(next.unwrap_or_default(), kind);
        self.reset_list_cursor();
    }

    /// Cycles the type filter: none, movie, series, episode, none.
    pub fn cycle_type_filter(&mut self) {
        let next = match self.session.type_filter() {
            None => MovieKind::FILTERABLE.first().copied(),
            Some(kind) => MovieKind::FILTERABLE
                .iter()
                .position(|k| *k == kind)
                .and_then(|i| MovieKind::FILTERABLE.get(i.saturating_add(1)))
                .copied(),
        };
        let year = String::from(self.session.year_filter());
        self.session.set_filters(year, next);
        self.reset_list_cursor();
    }

    /// Removes both filters.
    pub fn clear_filters(&mut self) {
        self.session.clear_filters();
        self.reset_list_cursor();
    }

    /// Resets the search and returns to an empty list.
    pub fn clear_search(&mut self) {
        self.session.clear_search();
        self.query_input.clear();
        self.list_table_state.select(None);
    }

    /// Applies a finished request.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Search { ticket, result } => {
                if self.session.complete_search(ticket, result) {
                    self.clamp_list_cursor();
                }
            }
            Outcome::Detail { id, result } => {
                if self.detail != DetailState::Loading(id) {
                    tracing::debug!("discarding superseded detail outcome");
                    return;
                }
                self.detail = match result {
                    Ok(detail) => DetailState::Loaded(detail),
                    Err(e) => DetailState::Failed(e.to_string()),
                };
            }
        }
    }

    /// Opens the detail view for the selected entry.
    pub fn open_detail(&mut self) -> Option<Request> {
        let id = self.selected_movie()?.id.clone();
        self.detail_return = self.view;
        self.view = View::Detail;
        self.detail = DetailState::Loading(id.clone());
        Some(Request::Detail { id })
    }

    /// Switches between the list and favorites views.
    pub fn toggle_favorites_view(&mut self) {
        self.view = match self.view {
            View::Favorites => View::List,
            View::List | View::Detail => View::Favorites,
        };
        if self.view == View::Favorites {
            self.clamp_favorites_cursor();
        }
    }

    /// Leaves the current view.
    pub fn back(&mut self) {
        self.view = match self.view {
            View::Detail => self.detail_return,
            View::List | View::Favorites => View::List,
        };
    }

    /// Adds or removes the focused entry from favorites.
    pub fn toggle_favorite(&mut self) {
        let Some(movie) = self.focused_movie() else {
            return;
        };
        self.favorites.toggle(&movie);
        if self.view == View::Favorites {
            self.clamp_favorites_cursor();
        }
    }

    /// Entry the current view is about: the selected row, or the detail record.
    #[must_use]
    pub fn focused_movie(&self) -> Option<MovieSummary> {
        match (&self.view, &self.detail) {
            (View::Detail, DetailState::Loaded(detail)) => Some(detail.summary.clone()),
            (View::Detail, _) => None,
            _ => self.selected_movie().cloned(),
        }
    }

    /// Highlighted row of the list or favorites view.
    #[must_use]
    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        match self.view {
            View::List => {
                let index = self.list_table_state.selected()?;
                self.session.visible_results().get(index).copied()
            }
            View::Favorites => {
                let index = self.favorites_table_state.selected()?;
                self.favorites.items().get(index)
            }
            View::Detail => None,
        }
    }

    /// Id to open in a browser: the detail record, else the selected row.
    #[must_use]
    pub fn focused_id(&self) -> Option<String> {
        match (&self.view, &self.detail) {
            (View::Detail, DetailState::Loaded(detail)) => Some(detail.summary.id.clone()),
            (View::Detail, DetailState::Loading(id)) => Some(id.clone()),
            _ => self.selected_movie().map(|m| m.id.clone()),
        }
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::List => self.session.visible_results().len(),
            View::Favorites => self.favorites.len(),
            View::Detail => 0,
        }
    }

    fn active_table_state(&mut self) -> Option<&mut TableState> {
        match self.view {
            View::List => Some(&mut self.list_table_state),
            View::Favorites => Some(&mut self.favorites_table_state),
            View::Detail => None,
        }
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        if let Some(table) = self.active_table_state() {
            let current = table.selected().unwrap_or(0);
            table.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves cursor down.
    pub fn move_down(&mut self) {
        self.page_down(1);
    }

    /// Scrolls up by a page.
    pub fn page_up(&mut self, page_size: usize) {
        if let Some(table) = self.active_table_state() {
            let current = table.selected().unwrap_or(0);
            table.select(Some(current.saturating_sub(page_size)));
        }
    }

    /// Scrolls down by a page.
    pub fn page_down(&mut self, page_size: usize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let max = count.saturating_sub(1);
        if let Some(table) = self.active_table_state() {
            let next = table
                .selected()
                .map_or(0, |current| current.saturating_add(page_size).min(max));
            table.select(Some(next));
        }
    }

    fn reset_list_cursor(&mut self) {
        let first = (!self.session.visible_results().is_empty()).then_some(0);
        self.list_table_state.select(first);
    }

    fn clamp_list_cursor(&mut self) {
        let count = self.session.visible_results().len();
        let selected = match (count, self.list_table_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (n, Some(i)) => Some(i.min(n.saturating_sub(1))),
        };
        self.list_table_state.select(selected);
    }

    fn clamp_favorites_cursor(&mut self) {
        let count = self.favorites.len();
        let selected = match (count, self.favorites_table_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (n, Some(i)) => Some(i.min(n.saturating_sub(1))),
        };
        self.favorites_table_state.select(selected);
    }
}
