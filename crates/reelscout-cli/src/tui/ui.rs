//! TUI rendering logic for the browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};
use reelscout_api::omdb::{MovieDetail, MovieSummary};
use reelscout_core::{PageLink, SessionPhase, Theme, error_suggestion, visible_pages};
use reelscout_db::KeyValueStore;

use super::state::{BrowserState, DetailState, InputMode, View};

/// Colours for one theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    heading: Color,
    favorite: Color,
    error: Color,
    muted: Color,
}

const fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            text: Color::Black,
            background: Color::White,
            accent: Color::Blue,
            heading: Color::Magenta,
            favorite: Color::Rgb(191, 128, 0),
            error: Color::Red,
            muted: Color::DarkGray,
        },
        Theme::Dark => Palette {
            text: Color::White,
            background: Color::Black,
            accent: Color::Cyan,
            heading: Color::Yellow,
            favorite: Color::Yellow,
            error: Color::LightRed,
            muted: Color::Gray,
        },
    }
}

/// Draws the browser UI. Returns the main content area height for page size calculation.
#[allow(clippy::indexing_slicing)]
pub fn draw<S: KeyValueStore>(frame: &mut Frame, state: &mut BrowserState<S>) -> u16 {
    let colors = palette(state.current_theme());
    frame.render_widget(
        Block::default().style(Style::default().fg(colors.text).bg(colors.background)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // main content
            Constraint::Length(4), // status
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state, colors);

    let main_area = chunks[1];
    match state.view {
        View::List => draw_results(frame, main_area, state, colors),
        View::Favorites => draw_favorites(frame, main_area, state, colors),
        View::Detail => draw_detail(frame, main_area, state, colors),
    }

    draw_status(frame, chunks[2], state, colors);
    draw_footer(frame, chunks[3], state);

    main_area.height
}

/// Draws the query input and the result counters.
#[allow(clippy::indexing_slicing)]
fn draw_header<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &BrowserState<S>,
    colors: Palette,
) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let query_style = if state.input_mode == InputMode::Query {
        Style::default().fg(colors.heading)
    } else {
        Style::default()
    };
    let query = Paragraph::new(state.query_input.clone())
        .style(query_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(query, header_chunks[0]);

    let session = &state.session;
    let summary = if session.has_searched() && session.total_pages() > 0 {
        format!(
            "Page {} of {} ({} results)  \u{2605} {}",
            session.current_page(),
            session.total_pages(),
            session.total_results(),
            state.favorites.len()
        )
    } else {
        format!("\u{2605} {}", state.favorites.len())
    };
    let info = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" reelscout [{}] ", state.current_theme())),
    );
    frame.render_widget(info, header_chunks[1]);
}

/// Draws the filtered result table.
fn draw_results<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut BrowserState<S>,
    colors: Palette,
) {
    let session = &state.session;
    let mut title = String::from(" Results ");
    if session.has_active_filters() {
        let year = if session.year_filter().is_empty() {
            "any year"
        } else {
            session.year_filter()
        };
        let kind = session.type_filter().map_or("any type", |k| k.label());
        title = format!(
            " Results: {} of {} ({year}, {kind}) ",
            session.visible_results().len(),
            session.results().len()
        );
    }

    let rows = movie_rows(&session.visible_results(), state, colors);
    let table = movie_table(rows, title, colors);
    frame.render_stateful_widget(table, area, &mut state.list_table_state);
}

/// Draws the favorites table.
fn draw_favorites<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut BrowserState<S>,
    colors: Palette,
) {
    let items: Vec<&MovieSummary> = state.favorites.items().iter().collect();
    let rows = movie_rows(&items, state, colors);
    let table = movie_table(rows, format!(" Favorites ({}) ", items.len()), colors);
    frame.render_stateful_widget(table, area, &mut state.favorites_table_state);
}

fn movie_rows<S: KeyValueStore>(
    movies: &[&MovieSummary],
    state: &BrowserState<S>,
    colors: Palette,
) -> Vec<Row<'static>> {
    movies
        .iter()
        .map(|m| {
            let saved = state.favorites.contains(&m.id);
            let style = if saved {
                Style::default().fg(colors.favorite)
            } else {
                Style::default()
            };
            Row::new(vec![
                String::from(if saved { "\u{2605}" } else { " " }),
                m.title.clone(),
                m.year.clone(),
                String::from(m.kind.as_str()),
                m.id.clone(),
            ])
            .style(style)
        })
        .collect()
}

fn movie_table(rows: Vec<Row<'static>>, title: String, colors: Palette) -> Table<'static> {
    let header = Row::new(vec!["", "Title", "Year", "Type", "IMDb"])
        .style(
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let widths = [
        Constraint::Length(2),
        Constraint::Min(20),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(11),
    ];

    Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors.accent)),
        )
        .row_highlight_style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
}

/// Draws the detail record.
fn draw_detail<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &BrowserState<S>,
    colors: Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent));

    let lines = match &state.detail {
        DetailState::Empty => vec![Line::from("Nothing selected.")],
        DetailState::Loading(id) => vec![Line::from(format!("Loading {id}..."))],
        DetailState::Failed(message) => vec![
            Line::from(Span::styled(message.clone(), Style::default().fg(colors.error))),
            Line::from(error_suggestion(message)),
        ],
        DetailState::Loaded(detail) => detail_lines(detail, state.favorites.contains(&detail.summary.id), colors),
    };

    let title = match &state.detail {
        DetailState::Loaded(detail) => format!(" {} ({}) ", detail.summary.title, detail.summary.year),
        _ => String::from(" Details "),
    };

    let paragraph = Paragraph::new(lines)
        .block(block.title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(detail: &MovieDetail, saved: bool, colors: Palette) -> Vec<Line<'static>> {
    let label = |name: &str| {
        Span::styled(
            format!("{name:<10}"),
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )
    };
    let or_dash = |value: &str| {
        if value.trim().is_empty() {
            String::from("-")
        } else {
            String::from(value)
        }
    };

    let rating = detail
        .rating_value()
        .map_or_else(|| String::from("-"), |r| format!("\u{2b50} {r}/10"));

    let mut lines = vec![
        Line::from(vec![label("Type"), Span::raw(detail.summary.kind.label())]),
        Line::from(vec![label("Rating"), Span::raw(rating)]),
        Line::from(vec![label("Released"), Span::raw(or_dash(&detail.release_date))]),
        Line::from(vec![label("Runtime"), Span::raw(or_dash(&detail.runtime))]),
        Line::from(vec![label("Genre"), Span::raw(detail.genres().join(" \u{b7} "))]),
        Line::from(vec![label("Director"), Span::raw(or_dash(&detail.director))]),
        Line::from(vec![label("Cast"), Span::raw(detail.actor_list().join(", "))]),
        Line::from(vec![
            label("Poster"),
            Span::raw(String::from(
                detail.summary.poster_url().unwrap_or("No poster available"),
            )),
        ]),
        Line::from(""),
        Line::from(or_dash(&detail.plot)),
    ];
    if saved {
        lines.insert(
            0,
            Line::from(Span::styled(
                "\u{2605} In your favorites",
                Style::default().fg(colors.favorite),
            )),
        );
    }
    lines
}

/// Draws loading/error state and the page window.
fn draw_status<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &BrowserState<S>,
    colors: Palette,
) {
    let session = &state.session;
    let mut lines = Vec::with_capacity(2);

    match session.phase() {
        SessionPhase::Idle => {
            lines.push(Line::from(Span::styled(
                "Press / to search the catalog.",
                Style::default().fg(colors.muted),
            )));
        }
        SessionPhase::Searching => {
            lines.push(Line::from(format!(
                "Searching \"{}\" (page {})...",
                session.query(),
                session.current_page()
            )));
        }
        SessionPhase::Errored => {
            let message = session.last_error().unwrap_or_default();
            lines.push(Line::from(Span::styled(
                String::from(message),
                Style::default().fg(colors.error),
            )));
            lines.push(Line::from(error_suggestion(message)));
        }
        SessionPhase::Results => {
            if session.results().is_empty() {
                lines.push(Line::from("No results."));
            } else if session.visible_results().is_empty() {
                lines.push(Line::from("No results match the current filters."));
            }
            lines.push(page_line(session.current_page(), session.total_pages(), colors));
        }
    }

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn page_line(current: u32, total: u32, colors: Palette) -> Line<'static> {
    let mut spans: Vec<Span> = visible_pages(current, total)
        .into_iter()
        .map(|link| match link {
            PageLink::Page(n) if n == current => Span::styled(
                format!("[{n}] "),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            PageLink::Page(n) => Span::raw(format!("{n} ")),
            PageLink::Ellipsis => Span::styled("\u{2026} ", Style::default().fg(colors.muted)),
        })
        .collect();
    if current < total {
        spans.push(Span::styled(
            "  m: load more",
            Style::default().fg(colors.muted),
        ));
    }
    Line::from(spans)
}

/// Draws the footer with key hints.
fn draw_footer<S: KeyValueStore>(frame: &mut Frame, area: Rect, state: &BrowserState<S>) {
    let help_text = match (&state.input_mode, &state.view) {
        (InputMode::Query, _) => Line::from("Type a title | Esc: cancel | Enter: search"),
        (InputMode::Normal, View::List) => Line::from(vec![Span::raw(
            "\u{2191}\u{2193}/j/k: move  /: search  Enter: details  m: more  g: page 1  y/t: year/type  x: clear filters  f: fav  F: favorites  T: theme  q: quit",
        )]),
        (InputMode::Normal, View::Favorites) => Line::from(vec![Span::raw(
            "\u{2191}\u{2193}/j/k: move  Enter: details  f: remove  o: open  Esc: back  T: theme  q: quit",
        )]),
        (InputMode::Normal, View::Detail) => Line::from(vec![Span::raw(
            "f: favorite  o: open IMDb  Esc: back  T: theme  q: quit",
        )]),
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
