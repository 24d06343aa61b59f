//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::CatalogError;
use super::types::{MovieDetail, SearchPage};

/// Remote movie catalog trait.
///
/// Abstracts catalog lookups for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
/// Both calls are single-shot: no retries and no timeout enforcement.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Searches titles and returns one page of summaries plus the total
    /// result count reported for the query.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the API key is missing, the transport
    /// fails, or the service rejects the query.
    async fn search(&self, title: &str, page: u32) -> Result<SearchPage, CatalogError>;

    /// Fetches full details for a single catalog id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the id does not resolve, and
    /// the same errors as [`LocalCatalogApi::search`] otherwise.
    async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, CatalogError>;
}
