//! Reqwest client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use flowdeck_core::case::KeyCase;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Error;

/// Default base URL of the workflow service.
pub const DEFAULT_BASE_URL: &str = "https://rubik.valyx.com";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the workflow service HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Base URL of the workflow service
    #[cfg_attr(
        feature = "config",
        arg(long = "base-url", env = "FLOWDECK_BASE_URL", default_value = DEFAULT_BASE_URL)
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Key casing of request bodies (`camel` or `snake`)
    #[cfg_attr(
        feature = "config",
        arg(long = "request-key-case", env = "FLOWDECK_REQUEST_KEY_CASE", default_value = "camel")
    )]
    #[serde(default)]
    pub request_key_case: KeyCase,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_timeout: default_timeout_secs(),
            user_agent: None,
            request_key_case: KeyCase::default(),
        }
    }
}

impl ReqwestConfig {
    /// Creates a configuration for the given service URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parses the base URL, accepting only absolute `http` and `https` URLs.
    pub fn parsed_base_url(&self) -> Result<Url, Error> {
        let url = Url::parse(&self.base_url)?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err(Error::InvalidBaseUrl(self.base_url.clone())),
        }
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("flowdeck/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the key casing of request bodies.
    #[must_use]
    pub fn with_request_key_case(mut self, key_case: KeyCase) -> Self {
        self.request_key_case = key_case;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReqwestConfig::default();
        assert_eq!(config.base_url, "https://rubik.valyx.com");
        assert_eq!(config.http_timeout, 30);
        assert_eq!(config.request_key_case, KeyCase::Camel);
        assert!(config.effective_user_agent().starts_with("flowdeck/"));
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = ReqwestConfig::default().with_timeout(0);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(
            config.with_timeout(5).effective_timeout(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_parsed_base_url() {
        assert!(ReqwestConfig::default().parsed_base_url().is_ok());
        assert!(ReqwestConfig::new("http://127.0.0.1:8080").parsed_base_url().is_ok());
        assert!(ReqwestConfig::new("ftp://example.com").parsed_base_url().is_err());
        assert!(ReqwestConfig::new("not a url").parsed_base_url().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ReqwestConfig =
            serde_json::from_str(r#"{ "request_key_case": "snake" }"#).unwrap();
        assert_eq!(config.request_key_case, KeyCase::Snake);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
