//! `OmdbClient` - OMDb API client implementation.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::CatalogApi;
use super::error::CatalogError;
use super::types::{MovieDetail, ResponseStatus, SearchEnvelope, SearchPage};

/// Default base URL for the OMDb API.
const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Fallback message when a rejection carries no `Error` field.
const GENERIC_REJECTION: &str = "API Error";

/// Error text OMDb returns for a malformed or unknown id.
const INCORRECT_ID: &str = "Incorrect IMDb ID.";

/// OMDb API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key. Checked on every call rather than at build time.
    api_key: Option<String>,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key. Blank keys are treated as absent.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// A missing API key is not a build error; every call fails fast with
    /// [`CatalogError::MissingApiKey`] instead.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key: self.api_key,
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Returns `true` when an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends a GET request with the API key and query params, then unwraps
    /// the `Response`/`Error` envelope.
    ///
    /// Service-reported failures come back as [`CatalogError::Rejected`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CatalogError::MissingApiKey)?;

        let request = self
            .http_client
            .get(self.base_url.clone())
            .query(&[("apikey", api_key)])
            .query(query)
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build request: {e}")))?;

        tracing::debug!(path = request.url().path(), ?query, "OMDb API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| CatalogError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Transport(format!(
                "Network response was not ok (HTTP {status})"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(format!("failed to read response body: {e}")))?;

        let envelope: ResponseStatus = serde_json::from_str(&body)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        if envelope.is_rejected() {
            let message = envelope
                .error
                .unwrap_or_else(|| String::from(GENERIC_REJECTION));
            return Err(CatalogError::Rejected(message));
        }

        serde_json::from_str(&body).map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }
}

/// Maps a detail-lookup rejection to `NotFound` when the id did not resolve.
fn classify_detail_rejection(err: CatalogError) -> CatalogError {
    match err {
        CatalogError::Rejected(message)
            if message == INCORRECT_ID || message.to_lowercase().contains("not found") =>
        {
            CatalogError::NotFound(message)
        }
        other => other,
    }
}

impl CatalogApi for OmdbClient {
    #[instrument(skip_all, fields(page = page))]
    async fn search(&self, title: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let query = [("s", String::from(title)), ("page", page.to_string())];

        let envelope: SearchEnvelope = self.get_json(&query).await?;

        let page = SearchPage::from(envelope);
        tracing::debug!(
            items = page.items.len(),
            total = page.total_count,
            "OMDb search page received"
        );
        Ok(page)
    }

    #[instrument(skip_all, fields(id = id))]
    async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, CatalogError> {
        let query = [("i", String::from(id)), ("plot", String::from("full"))];

        self.get_json(&query)
            .await
            .map_err(classify_detail_rejection)
    }
}
