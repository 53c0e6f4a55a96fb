//! HTTP client for the hosted payment gateway.
//!
//! Only transaction initialization is implemented: the gateway returns a
//! hosted checkout URL and the shopper completes payment there. The request
//! is wrapped in a [`RetryPolicy`]; body parsing happens once, after the
//! retries have produced a 2xx response.

use std::time::Duration;

use fakestore_core::{AppConfig, RetryPolicy};
use reqwest::{Client, Response, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{is_retriable, GatewayError};

/// Three retries one second apart: four attempts in total.
pub const DEFAULT_RETRY: RetryPolicy = RetryPolicy::fixed(3, Duration::from_secs(1));

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeRequest {
    /// Serialized as a decimal string, e.g. `"65.47"`.
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub customization: Customization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customization {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    #[serde(default)]
    checkout_url: Option<String>,
}

pub struct GatewayClient {
    client: Client,
    secret_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"[redacted]")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Creates a client against `base_url` with [`DEFAULT_RETRY`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, [`GatewayError::InvalidUrl`] if `base_url` does
    /// not parse, or [`GatewayError::MissingSecretKey`] if `secret_key` is
    /// blank.
    pub fn with_base_url(
        base_url: &str,
        secret_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GatewayError> {
        if secret_key.trim().is_empty() {
            return Err(GatewayError::MissingSecretKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GatewayError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            secret_key: secret_key.to_owned(),
            base_url,
            retry: DEFAULT_RETRY,
        })
    }

    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingSecretKey`] when no secret key is
    /// configured, otherwise the same as [`GatewayClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let secret_key = config
            .gateway_secret_key
            .as_deref()
            .ok_or(GatewayError::MissingSecretKey)?;
        let client = Self::with_base_url(
            &config.gateway_url,
            secret_key,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(client.with_retry(RetryPolicy::fixed(
            config.checkout_max_retries,
            Duration::from_millis(config.checkout_retry_delay_ms),
        )))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Initializes a hosted payment and returns the checkout URL to redirect
    /// the shopper to.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Http`] if every attempt failed below HTTP.
    /// - [`GatewayError::Rejected`] if every attempt got a non-2xx status.
    /// - [`GatewayError::Deserialize`] if the 2xx body is not JSON.
    /// - [`GatewayError::NoCheckoutUrl`] if the gateway did not report
    ///   success with a checkout URL.
    pub async fn initialize(&self, request: &InitializeRequest) -> Result<String, GatewayError> {
        let url = self
            .base_url
            .join("transaction/initialize")
            .map_err(|e| GatewayError::InvalidUrl {
                url: format!("{}transaction/initialize", self.base_url),
                reason: e.to_string(),
            })?;

        let response = self
            .retry
            .run(is_retriable, || self.post_initialize(&url, request))
            .await?;

        let body = response.text().await?;
        let parsed: InitializeResponse =
            serde_json::from_str(&body).map_err(GatewayError::Deserialize)?;

        match (parsed.status.as_deref(), parsed.data.and_then(|d| d.checkout_url)) {
            (Some("success"), Some(checkout_url)) if !checkout_url.is_empty() => {
                tracing::info!(tx_ref = %request.tx_ref, "gateway payment initialized");
                Ok(checkout_url)
            }
            (status, _) => {
                tracing::warn!(tx_ref = %request.tx_ref, ?status, "gateway returned no checkout URL");
                Err(GatewayError::NoCheckoutUrl)
            }
        }
    }

    async fn post_initialize(
        &self,
        url: &Url,
        request: &InitializeRequest,
    ) -> Result<Response, GatewayError> {
        tracing::debug!(%url, tx_ref = %request.tx_ref, "gateway initialize");
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).ok())
            .and_then(|body| body.get("message")?.as_str().map(str::to_owned))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
