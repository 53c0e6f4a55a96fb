//! HTTP client for the demo product catalog.
//!
//! Wraps `reqwest` with catalog-specific error handling and typed response
//! deserialization. Reads go through the configured [`RetryPolicy`]; writes
//! and the credential check are sent exactly once.

use std::time::Duration;

use fakestore_core::{AppConfig, RetryPolicy};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{is_retriable, CatalogError};

/// Client for the catalog REST API.
///
/// Use [`CatalogClient::from_config`] in the application, or
/// [`CatalogClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) retry: RetryPolicy,
}

/// Error body shape used by the catalog: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl CatalogClient {
    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::none(),
        })
    }

    /// Builds a client from application config, with exponential back-off on
    /// transient read failures.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = Self::with_base_url(
            &config.catalog_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(client.with_retry(RetryPolicy::exponential(
            config.catalog_max_retries,
            Duration::from_millis(config.catalog_retry_backoff_ms),
        )))
    }

    /// Replaces the retry policy applied to read requests.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolves `path` (no leading slash) against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// GETs `url` and deserializes the body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] on 404 or an empty body.
    /// - [`CatalogError::Rejected`] on any other non-2xx status.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Deserialize`] if the body does not match `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        fallback: &str,
    ) -> Result<T, CatalogError> {
        let client = &self.client;
        self.retry
            .run(is_retriable, move || async move {
                tracing::debug!(%url, "catalog GET");
                let response = client.get(url.clone()).send().await?;
                Self::read_json(response, url, fallback).await
            })
            .await
    }

    /// Sends `body` as JSON with the given method and deserializes the reply.
    /// Not retried.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        url: &Url,
        body: &B,
        fallback: &str,
    ) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, %method, "catalog request");
        let response = self
            .client
            .request(method, url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Self::read_json(response, url, fallback).await
    }

    /// Sends a bodyless request and only checks the status. Not retried.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        url: &Url,
        fallback: &str,
    ) -> Result<(), CatalogError> {
        tracing::debug!(%url, %method, "catalog request");
        let response = self.client.request(method, url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::rejection(response, url, fallback).await)
    }

    /// Asserts a 2xx status and parses the body as JSON.
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        url: &Url,
        fallback: &str,
    ) -> Result<T, CatalogError> {
        if !response.status().is_success() {
            return Err(Self::rejection(response, url, fallback).await);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(CatalogError::NotFound {
                url: url.to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Turns a non-2xx response into a typed error, preferring the server's
    /// `message` field over `fallback`.
    async fn rejection(response: Response, url: &Url, fallback: &str) -> CatalogError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return CatalogError::NotFound {
                url: url.to_string(),
            };
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_owned());

        tracing::debug!(%url, status = status.as_u16(), %message, "catalog rejected request");
        CatalogError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
