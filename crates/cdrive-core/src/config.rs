//! Configuration module
//!
//! The remote API origin is the only externally supplied setting. Everything else
//! is a constant that callers may override through the builder methods.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load from environment: CDRIVE_API_URL (or API_URL). Reads `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("CDRIVE_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(api_url)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
