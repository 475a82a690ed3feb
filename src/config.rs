use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::AppError;
use crate::external::{newsapi, yahoo};

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Without a key the news branch is disabled and every request reports
    /// missing sentiment.
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    pub news_language: String,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::Config(format!("HTTP_TIMEOUT_SECS must be a whole number, got '{}'", raw))
                })?;
                if secs == 0 {
                    return Err(AppError::Config("HTTP_TIMEOUT_SECS must be positive".to_string()));
                }
                secs
            }
            None => Self::DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let bind_raw = non_empty("BIND_ADDR").unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|e| AppError::Config(format!("BIND_ADDR '{}' is invalid: {}", bind_raw, e)))?;

        Ok(Self {
            news_api_key: non_empty("NEWS_API_KEY"),
            news_api_base_url: non_empty("NEWS_API_BASE_URL")
                .unwrap_or_else(|| newsapi::DEFAULT_BASE_URL.to_string()),
            news_language: non_empty("NEWS_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            yahoo_base_url: non_empty("YAHOO_BASE_URL")
                .unwrap_or_else(|| yahoo::DEFAULT_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
            bind_addr,
        })
    }
}
