//! Structured error handling for editor and service operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while editing or persisting workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The service answered with a non-success HTTP status.
    Request,
    /// One of the parallel node catalog fetches failed.
    AggregateFetch,
    /// A workflow document had no usable definition payload.
    MalformedDefinition,
    /// Input validation failed.
    InvalidInput,
    /// A prospective edge violates a connectivity rule.
    InvalidConnection,
    /// Saving is not allowed in the current editor state.
    SaveBlocked,
    /// Network-related error occurred.
    NetworkError,
    /// Timeout occurred.
    Timeout,
    /// Serialization/deserialization error.
    Serialization,
    /// Configuration error.
    Configuration,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Returns the snake_case name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is typically retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Structured error type with classification, HTTP status and source tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("{}", message.as_deref().unwrap_or(kind.as_str()))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary, user-displayable error message.
    pub message: Option<String>,
    /// HTTP status code, for request errors.
    pub status: Option<u16>,
    /// HTTP status text, for request errors.
    pub status_text: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
            status_text: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self::new(kind).with_source(source)
    }

    /// Creates a request error for a non-success response.
    ///
    /// The message reads `Failed to {operation}: {status_text}`.
    pub fn request(operation: &str, status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            kind: ErrorKind::Request,
            message: Some(format!("Failed to {operation}: {status_text}")),
            status: Some(status),
            status_text: Some(status_text),
            source: None,
        }
    }

    /// Wraps the failure of one catalog fetch into an aggregate fetch error.
    pub fn aggregate_fetch(inner: Error) -> Self {
        let message = format!("Failed to fetch all node types: {inner}");
        Self::new(ErrorKind::AggregateFetch)
            .with_message(message)
            .with_source(inner)
    }

    /// Creates a malformed definition error.
    pub fn malformed_definition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDefinition).with_message(message)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new invalid connection error.
    pub fn invalid_connection() -> Self {
        Self::new(ErrorKind::InvalidConnection)
    }

    /// Creates a new save blocked error.
    pub fn save_blocked() -> Self {
        Self::new(ErrorKind::SaveBlocked)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if this error is retryable.
    ///
    /// Request errors are retryable for 5xx, 408 and 429 responses.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match (self.kind, self.status) {
            (ErrorKind::Request, Some(status)) => {
                status >= 500 || status == 408 || status == 429
            }
            (kind, _) => kind.is_retryable(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        let message = error.to_string();
        Self::from_source(ErrorKind::Serialization, error).with_message(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::from_source(ErrorKind::Unknown, error).with_message("I/O operation failed")
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Unknown);
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert!(error.message.is_none());
        assert!(error.status.is_none());
        assert!(error.source.is_none());
        assert_eq!(error.to_string(), "unknown");
    }

    #[test]
    fn test_request_error_carries_status_text() {
        let error = Error::request("fetch nodes", 404, "Not Found");

        assert_eq!(error.kind, ErrorKind::Request);
        assert_eq!(error.status, Some(404));
        assert_eq!(error.status_text.as_deref(), Some("Not Found"));
        assert_eq!(error.to_string(), "Failed to fetch nodes: Not Found");
    }

    #[test]
    fn test_aggregate_fetch_wraps_inner_message() {
        let inner = Error::request("fetch nodes", 500, "Internal Server Error");
        let error = Error::aggregate_fetch(inner);

        assert_eq!(error.kind, ErrorKind::AggregateFetch);
        assert_eq!(
            error.to_string(),
            "Failed to fetch all node types: Failed to fetch nodes: Internal Server Error"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::request("fetch workflow", 503, "Service Unavailable").is_retryable());
        assert!(Error::request("fetch workflow", 429, "Too Many Requests").is_retryable());
        assert!(!Error::request("fetch workflow", 404, "Not Found").is_retryable());
        assert!(Error::timeout().is_retryable());
        assert!(!Error::save_blocked().is_retryable());
    }

    #[test]
    fn test_from_serde_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(parse);
        assert_eq!(error.kind, ErrorKind::Serialization);
        assert!(error.message.is_some());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(ErrorKind::from_str("request").unwrap(), ErrorKind::Request);
        assert_eq!(
            ErrorKind::from_str("aggregate_fetch").unwrap(),
            ErrorKind::AggregateFetch
        );
        assert!(ErrorKind::from_str("invalid").is_err());
        assert_eq!(ErrorKind::SaveBlocked.as_str(), "save_blocked");
    }
}
