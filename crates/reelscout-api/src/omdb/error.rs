//! Catalog error type.

use thiserror::Error;

/// Errors surfaced by catalog lookups.
///
/// The `Display` output is the human-readable message stored by callers,
/// so remote rejections render the service's own text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No API key configured. Raised before any request is sent.
    #[error(
        "API key is missing. Set the OMDB_API_KEY environment variable or `api_key` under [omdb] in config.toml"
    )]
    MissingApiKey,

    /// Network failure or a non-success HTTP status.
    #[error("{0}")]
    Transport(String),

    /// The service answered `Response: "False"`.
    #[error("{0}")]
    Rejected(String),

    /// A detail lookup for an id the catalog does not know.
    #[error("{0}")]
    NotFound(String),

    /// The payload could not be decoded.
    #[error("invalid response from catalog: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Returns `true` when repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
