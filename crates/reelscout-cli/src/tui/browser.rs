//! Browser TUI main loop.

#![allow(clippy::future_not_send)]

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use reelscout_api::omdb::CatalogApi;
use reelscout_core::{FavoritesStore, Theme, ThemePreference};
use reelscout_db::KeyValueStore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::state::{BrowserState, InputMode, Outcome, Request, View};
use super::ui;

/// Delay between frames while no key is pending.
const TICK: Duration = Duration::from_millis(50);

/// IMDb title page prefix.
const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    /// Leave the TUI.
    Quit,
    /// Run a catalog request.
    Fetch(Request),
}

/// Runs the browser TUI.
///
/// Catalog requests run on spawned tasks and report back over a channel,
/// so the screen keeps redrawing while they are in flight.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser<A, S>(
    api: Arc<A>,
    store: S,
    fallback_theme: Theme,
    initial_query: Option<String>,
) -> Result<()>
where
    A: CatalogApi + Send + Sync + 'static,
    S: KeyValueStore + Copy,
{
    let mut state = BrowserState::new(
        FavoritesStore::load(store),
        ThemePreference::load(store, fallback_theme),
    );
    let (tx, mut rx) = unbounded_channel();

    if let Some(query) = initial_query {
        state.query_input = query;
        if let Some(request) = state.submit_query() {
            spawn_request(&api, &tx, request);
        }
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut state, &api, &tx, &mut rx).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<A, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState<S>,
    api: &Arc<A>,
    tx: &UnboundedSender<Outcome>,
    rx: &mut UnboundedReceiver<Outcome>,
) -> Result<()>
where
    A: CatalogApi + Send + Sync + 'static,
    S: KeyValueStore,
{
    let mut main_area_height: u16 = 0;

    loop {
        while let Ok(outcome) = rx.try_recv() {
            state.apply(outcome);
        }

        terminal
            .draw(|frame| {
                main_area_height = ui::draw(frame, state);
            })
            .context("failed to draw TUI")?;

        let page_size = usize::from(main_area_height.saturating_sub(4));

        if !event::poll(Duration::ZERO).context("failed to poll events")? {
            tokio::time::sleep(TICK).await;
            continue;
        }

        if let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            let action = match state.input_mode {
                InputMode::Query => handle_query_input(state, key.code),
                InputMode::Normal => handle_normal_input(state, key.code, key.modifiers, page_size),
            };
            match action {
                Some(KeyAction::Quit) => return Ok(()),
                Some(KeyAction::Fetch(request)) => spawn_request(api, tx, request),
                None => {}
            }
        }
    }
}

/// Runs `request` on a task and sends its outcome to `tx`.
fn spawn_request<A>(api: &Arc<A>, tx: &UnboundedSender<Outcome>, request: Request)
where
    A: CatalogApi + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match request {
            Request::Search { ticket, query } => Outcome::Search {
                ticket,
                result: api.search(&query, ticket.page()).await,
            },
            Request::Detail { id } => {
                let result = api.fetch_detail(&id).await.map(Box::new);
                Outcome::Detail { id, result }
            }
        };
        // The receiver is gone once the TUI has exited.
        let _ = tx.send(outcome);
    });
}

/// Handles key input in query mode.
fn handle_query_input<S: KeyValueStore>(
    state: &mut BrowserState<S>,
    key: KeyCode,
) -> Option<KeyAction> {
    match key {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            return state.submit_query().map(KeyAction::Fetch);
        }
        KeyCode::Backspace => {
            state.query_input.pop();
        }
        KeyCode::Char(c) => {
            state.query_input.push(c);
        }
        _ => {}
    }
    None
}

/// Handles key input in normal mode.
fn handle_normal_input<S: KeyValueStore>(
    state: &mut BrowserState<S>,
    key: KeyCode,
    modifiers: KeyModifiers,
    page_size: usize,
) -> Option<KeyAction> {
    let request = match key {
        KeyCode::Char('q') => return Some(KeyAction::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(KeyAction::Quit);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.move_up();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.move_down();
            None
        }
        KeyCode::PageUp => {
            state.page_up(page_size);
            None
        }
        KeyCode::PageDown => {
            state.page_down(page_size);
            None
        }
        KeyCode::Char('T') => {
            state.toggle_theme();
            None
        }
        KeyCode::Char('f') => {
            state.toggle_favorite();
            None
        }
        KeyCode::Char('o') => {
            open_imdb_url(state);
            None
        }
        KeyCode::Esc | KeyCode::Backspace => {
            state.back();
            None
        }
        KeyCode::Char('F') | KeyCode::Tab => {
            state.toggle_favorites_view();
            None
        }
        KeyCode::Enter if state.view != View::Detail => state.open_detail(),
        _ if state.view == View::List => handle_list_key(state, key),
        _ => None,
    };
    request.map(KeyAction::Fetch)
}

/// Keys only meaningful in the results list.
fn handle_list_key<S: KeyValueStore>(state: &mut BrowserState<S>, key: KeyCode) -> Option<Request> {
    match key {
        KeyCode::Char('/') => {
            state.input_mode = InputMode::Query;
            None
        }
        KeyCode::Char('m') => state.load_more(),
        KeyCode::Char('g') => state.first_page(),
        KeyCode::Char('y') => {
            state.cycle_year_filter();
            None
        }
        KeyCode::Char('t') => {
            state.cycle_type_filter();
            None
        }
        KeyCode::Char('x') => {
            state.clear_filters();
            None
        }
        KeyCode::Char('c') => {
            state.clear_search();
            None
        }
        _ => None,
    }
}

/// Opens the IMDb page of the focused title.
fn open_imdb_url<S: KeyValueStore>(state: &BrowserState<S>) {
    let Some(id) = state.focused_id() else {
        return;
    };
    let url = format!("{IMDB_TITLE_URL}/{id}/");
    if let Err(e) = open::that(&url) {
        tracing::debug!(error = %e, url = %url, "failed to open browser");
    }
}
