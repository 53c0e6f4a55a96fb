use std::path::PathBuf;

/// Whether the cart outlives the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartPersistence {
    /// Rehydrated from the state directory at startup and written on every mutation.
    #[default]
    Durable,
    /// In-memory only. A previously persisted cart is discarded at startup.
    Session,
}

impl std::fmt::Display for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartPersistence::Durable => write!(f, "durable"),
            CartPersistence::Session => write!(f, "session"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub catalog_url: String,
    /// `FAKESTORE_STATE_DIR`, else the platform data directory.
    pub state_dir: PathBuf,
    pub cart_persistence: CartPersistence,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub catalog_max_retries: u32,
    pub catalog_retry_backoff_ms: u64,
    pub gateway_url: String,
    pub gateway_secret_key: Option<String>,
    pub gateway_currency: String,
    pub checkout_return_url: String,
    pub checkout_max_retries: u32,
    pub checkout_retry_delay_ms: u64,
    pub store_title: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("catalog_url", &self.catalog_url)
            .field("state_dir", &self.state_dir)
            .field("cart_persistence", &self.cart_persistence)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("catalog_max_retries", &self.catalog_max_retries)
            .field("catalog_retry_backoff_ms", &self.catalog_retry_backoff_ms)
            .field("gateway_url", &self.gateway_url)
            .field(
                "gateway_secret_key",
                &self.gateway_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gateway_currency", &self.gateway_currency)
            .field("checkout_return_url", &self.checkout_return_url)
            .field("checkout_max_retries", &self.checkout_max_retries)
            .field("checkout_retry_delay_ms", &self.checkout_retry_delay_ms)
            .field("store_title", &self.store_title)
            .finish()
    }
}
