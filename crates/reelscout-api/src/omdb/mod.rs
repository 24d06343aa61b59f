//! OMDb API client module.
//!
//! Issues title searches and id lookups against the OMDb endpoint
//! and normalizes its `Response`/`Error` envelope into [`CatalogError`].

mod api;
mod client;
mod error;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{OmdbClient, OmdbClientBuilder};
pub use error::CatalogError;
pub use types::{MovieDetail, MovieKind, MovieSummary, POSTER_UNAVAILABLE, SearchPage};
