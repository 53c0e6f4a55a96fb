use std::path::PathBuf;

use directories::ProjectDirs;

use crate::app_config::{AppConfig, CartPersistence};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key), default_state_dir())
}

/// Per-user data directory for durable client state, e.g.
/// `~/.local/share/fakestore` on Linux. `None` when the platform reports no
/// home directory.
#[must_use]
pub fn default_state_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "fakestore", "fakestore").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a working
/// configuration pointed at the public demo catalog. `FAKESTORE_STATE_DIR`
/// falls back to `default_state_dir` and is required only when there is none.
/// The gateway secret is optional; checkout through the hosted gateway refuses
/// to start without it.
fn build_app_config<F>(
    lookup: F,
    default_state_dir: Option<PathBuf>,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("FAKESTORE_LOG_LEVEL", "info");

    let catalog_url = parse_url(
        "FAKESTORE_CATALOG_URL",
        &or_default("FAKESTORE_CATALOG_URL", "https://fakestoreapi.com"),
    )?;
    let state_dir = match lookup("FAKESTORE_STATE_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => default_state_dir
            .ok_or_else(|| ConfigError::MissingEnvVar("FAKESTORE_STATE_DIR".to_string()))?,
    };
    let cart_persistence =
        parse_cart_persistence(&or_default("FAKESTORE_CART_PERSISTENCE", "durable"))?;

    let request_timeout_secs = parse_u64("FAKESTORE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FAKESTORE_USER_AGENT", "fakestore/0.1 (storefront-client)");
    let catalog_max_retries = parse_u32("FAKESTORE_CATALOG_MAX_RETRIES", "2")?;
    let catalog_retry_backoff_ms = parse_u64("FAKESTORE_CATALOG_RETRY_BACKOFF_MS", "500")?;

    let gateway_url = parse_url(
        "FAKESTORE_GATEWAY_URL",
        &or_default("FAKESTORE_GATEWAY_URL", "https://api.chapa.co/v1"),
    )?;
    let gateway_secret_key = lookup("FAKESTORE_GATEWAY_SECRET_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let gateway_currency = or_default("FAKESTORE_GATEWAY_CURRENCY", "ETB");
    let checkout_return_url = parse_url(
        "FAKESTORE_CHECKOUT_RETURN_URL",
        &or_default(
            "FAKESTORE_CHECKOUT_RETURN_URL",
            "http://localhost:3000/payment/success",
        ),
    )?;
    let checkout_max_retries = parse_u32("FAKESTORE_CHECKOUT_MAX_RETRIES", "3")?;
    let checkout_retry_delay_ms = parse_u64("FAKESTORE_CHECKOUT_RETRY_DELAY_MS", "1000")?;
    let store_title = or_default("FAKESTORE_STORE_TITLE", "E-Commerce Store");

    Ok(AppConfig {
        log_level,
        catalog_url,
        state_dir,
        cart_persistence,
        request_timeout_secs,
        user_agent,
        catalog_max_retries,
        catalog_retry_backoff_ms,
        gateway_url,
        gateway_secret_key,
        gateway_currency,
        checkout_return_url,
        checkout_max_retries,
        checkout_retry_delay_ms,
        store_title,
    })
}

fn parse_cart_persistence(s: &str) -> Result<CartPersistence, ConfigError> {
    match s {
        "durable" => Ok(CartPersistence::Durable),
        "session" => Ok(CartPersistence::Session),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FAKESTORE_CART_PERSISTENCE".to_string(),
            reason: format!("expected \"durable\" or \"session\", got \"{other}\""),
        }),
    }
}

/// Only `http` and `https` URLs are accepted. The trailing slash is stripped so
/// callers can append paths with `format!("{base}/...")`.
fn parse_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{raw}\" is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
