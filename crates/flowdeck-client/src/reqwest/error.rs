//! Error types for the reqwest transport.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),
    /// The base URL is not an absolute http(s) URL.
    #[error("Invalid base URL: {0} is not an absolute http(s) URL")]
    InvalidBaseUrl(String),
}

impl From<Error> for flowdeck_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    Self::timeout().with_message(e.to_string()).with_source(e)
                } else if e.is_connect() {
                    Self::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() || e.is_body() {
                    Self::serialization().with_message(e.to_string()).with_source(e)
                } else {
                    Self::network_error().with_message(e.to_string()).with_source(e)
                }
            }
            Error::Serde(e) => Self::serialization().with_message(e.to_string()).with_source(e),
            e @ (Error::Url(_) | Error::InvalidBaseUrl(_)) => {
                Self::configuration().with_message(e.to_string()).with_source(e)
            }
        }
    }
}
