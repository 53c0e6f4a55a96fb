use thiserror::Error;

/// Errors returned by the catalog API client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced an HTTP response: DNS, connect, TLS,
    /// timeout, or a body that could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 404, or the empty body the demo catalog sends for unknown ids.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx response. `message` is the server's `message` field
    /// when the body carried one, otherwise an operation-specific fallback.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but is missing something the caller needs.
    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("invalid catalog URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CatalogError {
    /// `true` when the failure happened below HTTP, i.e. the server was never
    /// heard from.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Http(_))
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** connect failures, timeouts, HTTP 429 and 5xx.
///
/// **Not retriable:** 404 and other 4xx rejections, deserialization and
/// malformed-body errors, invalid URLs.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
        CatalogError::Rejected { status, .. } => *status == 429 || *status >= 500,
        CatalogError::NotFound { .. }
        | CatalogError::Deserialize { .. }
        | CatalogError::Malformed { .. }
        | CatalogError::InvalidUrl { .. } => false,
    }
}
