use fakestore_state::auth::NETWORK_ERROR;
use fakestore_state::StateError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Shown when a checkout fails in a way the shopper cannot act on.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Errors returned by the payment gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced an HTTP response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the gateway's `message` field when it
    /// is a string, otherwise `HTTP error! status: <code>`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// 2xx response without `status == "success"` and a checkout URL.
    #[error("Failed to get checkout URL")]
    NoCheckoutUrl,

    #[error("JSON deserialization error for gateway response: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("invalid gateway URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("payment gateway secret key is not configured (set FAKESTORE_GATEWAY_SECRET_KEY)")]
    MissingSecretKey,
}

/// Retries transport failures and non-2xx statuses; a 2xx reply is final
/// even when it carries no checkout URL.
pub(crate) fn is_retriable(err: &GatewayError) -> bool {
    matches!(err, GatewayError::Http(_) | GatewayError::Rejected { .. })
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please log in to proceed with checkout")]
    LoginRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("no payment is awaiting confirmation")]
    NoPendingPayment,

    #[error("transaction reference {received} does not match the pending payment")]
    TransactionMismatch { received: String },

    #[error("could not update local state: {0}")]
    Storage(#[from] StateError),
}

impl CheckoutError {
    /// Text suitable for showing to the shopper.
    ///
    /// Transport failures become a generic network message; storage
    /// failures become a generic retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Gateway(GatewayError::Http(_)) => NETWORK_ERROR.to_owned(),
            CheckoutError::Gateway(
                GatewayError::Deserialize(_)
                | GatewayError::InvalidUrl { .. }
                | GatewayError::MissingSecretKey,
            )
            | CheckoutError::Storage(_) => UNEXPECTED_ERROR.to_owned(),
            other => other.to_string(),
        }
    }
}
