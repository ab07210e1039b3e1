//! Fetching of raw endpoint lists from their configured sources.
//!
//! The fetcher is a seam: the rotation manager only needs "URL in, text out",
//! so tests substitute an in-memory implementation while production uses
//! [`HttpFetcher`] over a shared `reqwest` client.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

// ============================================================================
// EndpointListFetcher
// ============================================================================

/// Source of raw endpoint-list text.
#[async_trait]
pub trait EndpointListFetcher: Send + Sync {
    /// Fetches the raw list body from `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is unreachable or answers with a
    /// non-success status.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

// ============================================================================
// HttpFetcher
// ============================================================================

/// HTTP implementation of [`EndpointListFetcher`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh client.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher over an existing client.
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EndpointListFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
