//! OMDb response types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Poster value the service uses when no image is available.
pub const POSTER_UNAVAILABLE: &str = "N/A";

/// Catalog entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieKind {
    /// Feature film.
    Movie,
    /// TV series.
    Series,
    /// Single episode of a series.
    Episode,
    /// Any kind the service reports that is not listed above.
    #[serde(other)]
    Other,
}

impl MovieKind {
    /// Kinds selectable as a type filter, in display order.
    pub const FILTERABLE: [Self; 3] = [Self::Movie, Self::Series, Self::Episode];

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
            Self::Other => "other",
        }
    }

    /// Plural display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Movie => "Movies",
            Self::Series => "TV Series",
            Self::Episode => "Episodes",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MovieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            "episode" => Ok(Self::Episode),
            other => Err(format!(
                "unknown type `{other}` (expected movie, series or episode)"
            )),
        }
    }
}

/// A single search hit. Field names follow the OMDb payload so the same
/// shape is used for the wire and for persisted favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Stable catalog identifier (IMDb id).
    #[serde(rename = "imdbID")]
    pub id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, or a year range for series (e.g. `2008–2013`).
    #[serde(rename = "Year")]
    pub year: String,
    /// Entry kind.
    #[serde(rename = "Type")]
    pub kind: MovieKind,
    /// Poster URL or [`POSTER_UNAVAILABLE`].
    #[serde(rename = "Poster", default = "poster_unavailable")]
    pub poster: String,
}

fn poster_unavailable() -> String {
    String::from(POSTER_UNAVAILABLE)
}

impl MovieSummary {
    /// Returns the poster URL, or `None` when the service has no image.
    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        let poster = self.poster.trim();
        (!poster.is_empty() && poster != POSTER_UNAVAILABLE).then_some(poster)
    }

    /// Leading numeric part of the year (`"2008–2013"` -> `2008`).
    #[must_use]
    pub fn start_year(&self) -> Option<u32> {
        let digits: String = self
            .year
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

/// Full record returned by an id lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Summary fields shared with search hits.
    #[serde(flatten)]
    pub summary: MovieSummary,
    /// Plot synopsis.
    #[serde(rename = "Plot", default)]
    pub plot: String,
    /// IMDb rating as a numeric string (0-10) or `N/A`.
    #[serde(rename = "imdbRating", default)]
    pub rating: String,
    /// Director(s).
    #[serde(rename = "Director", default)]
    pub director: String,
    /// Comma-delimited cast list.
    #[serde(rename = "Actors", default)]
    pub actors: String,
    /// Comma-delimited genre list.
    #[serde(rename = "Genre", default)]
    pub genre: String,
    /// Runtime (e.g. `152 min`).
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    /// Release date (e.g. `18 Jul 2008`).
    #[serde(rename = "Released", default)]
    pub release_date: String,
}

impl MovieDetail {
    /// Genres in transport order.
    #[must_use]
    pub fn genres(&self) -> Vec<&str> {
        split_list(&self.genre)
    }

    /// Cast in transport order.
    #[must_use]
    pub fn actor_list(&self) -> Vec<&str> {
        split_list(&self.actors)
    }

    /// Parsed rating, `None` when the service reports `N/A`.
    #[must_use]
    pub fn rating_value(&self) -> Option<f32> {
        self.rating.trim().parse().ok()
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != POSTER_UNAVAILABLE)
        .collect()
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    /// Hits in service order.
    pub items: Vec<MovieSummary>,
    /// Total hits for the query across all pages.
    pub total_count: u32,
}

/// `Response`/`Error` envelope present on every OMDb payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseStatus {
    /// `"True"` or `"False"`.
    #[serde(rename = "Response", default)]
    pub response: String,
    /// Error text when `response` is `"False"`.
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl ResponseStatus {
    /// Returns `true` when the service reported a failure.
    pub(crate) fn is_rejected(&self) -> bool {
        self.response.eq_ignore_ascii_case("false")
    }
}

/// Payload of an `s=` search request.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    /// Hits on the requested page.
    #[serde(rename = "Search", default)]
    pub search: Vec<MovieSummary>,
    /// Total hit count, sent as a string.
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

impl From<SearchEnvelope> for SearchPage {
    fn from(envelope: SearchEnvelope) -> Self {
        let total_count = envelope
            .total_results
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        Self {
            items: envelope.search,
            total_count,
        }
    }
}
