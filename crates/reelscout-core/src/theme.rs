//! Light/dark theme preference.

use std::fmt;
use std::str::FromStr;

use reelscout_db::KeyValueStore;
use serde::{Deserialize, Serialize};

/// Storage key holding the theme name.
pub const THEME_KEY: &str = "reelscout.theme";

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme `{other}` (expected light or dark)")),
        }
    }
}

/// Theme choice persisted under [`THEME_KEY`].
#[derive(Debug)]
pub struct ThemePreference<S> {
    store: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemePreference<S> {
    /// Reads the stored theme, using `fallback` when it is missing or invalid.
    pub fn load(store: S, fallback: Theme) -> Self {
        let current = match store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "ignoring stored theme");
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load theme");
                fallback
            }
        };
        Self { store, current }
    }

    /// Active theme.
    #[must_use]
    pub const fn get(&self) -> Theme {
        self.current
    }

    /// Sets and persists `theme`.
    pub fn set(&mut self, theme: Theme) {
        self.current = theme;
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            tracing::warn!(error = %e, "failed to persist theme");
        }
    }

    /// Switches to the other theme and returns it.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.set(next);
        next
    }
}
