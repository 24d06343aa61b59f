//! Core state for reelscout.
//!
//! Holds the search session state machine that drives catalog lookups,
//! the persisted favorites collection, the theme preference, and small
//! presentation helpers shared by the CLI and the TUI.

/// Persisted favorites collection.
pub mod favorites;
/// Page-number window for pagination controls.
pub mod pagination;
/// Search session state machine.
pub mod session;
/// Error-message to suggestion mapping.
pub mod suggestion;
/// Light/dark theme preference.
pub mod theme;

pub use favorites::{FAVORITES_KEY, FavoritesStore};
pub use pagination::{PageLink, visible_pages};
pub use session::{PAGE_SIZE, SearchSession, SearchTicket, SessionPhase};
pub use suggestion::error_suggestion;
pub use theme::{THEME_KEY, Theme, ThemePreference};
