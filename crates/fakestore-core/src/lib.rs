pub mod app_config;
pub mod config;
pub mod products;
pub mod retry;
pub mod users;

pub use app_config::{AppConfig, CartPersistence};
pub use config::{default_state_dir, load_app_config, load_app_config_from_env};
pub use products::{CartItem, CatalogProduct, Product, Rating, SortKey};
pub use retry::{Backoff, RetryPolicy};
pub use users::{Address, Geolocation, NewUser, PersonName, Session, User, UserAccount, UserUpdate};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0} (no platform data directory to default to)")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown sort key: {0} (expected price-asc, price-desc, name-asc or name-desc)")]
    InvalidSortKey(String),
}
