//! Client configuration.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.uptime-monitor.io";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "UPTIME_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "UPTIME_BASE_URL";

/// Connection settings shared by every request a backend makes.
///
/// Built once and never mutated afterwards; backends borrow what they
/// need at construction time.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: SecretString,
    base_url: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Overall timeout for a single request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration from explicit values.
    ///
    /// An empty key is rejected. The base URL loses any trailing slash.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "API key is required; set {API_KEY_ENV} or pass it explicitly"
            )));
        }

        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("base URL must not be empty".to_string()));
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            user_agent: format!("uptimekit/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        })
    }

    /// Resolve configuration with explicit values taking precedence over
    /// `UPTIME_API_KEY` / `UPTIME_BASE_URL`.
    pub fn resolve(api_key: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        let key = non_empty(api_key)
            .map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default();

        let url = non_empty(base_url)
            .map(str::to_string)
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(key, url)
    }

    /// Resolve configuration from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the `Authorization` header.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
