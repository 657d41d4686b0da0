//! Error types for signal scoring.
//!
//! Two error families live here. [`FetchError`] describes why a single
//! document could not be retrieved; it never escapes the pipeline and is
//! folded into the report instead. [`SignalError`] covers faults that happen
//! before any document is scored: loading configuration, compiling keyword
//! vocabularies, building the HTTP client.
//!
//! # Example
//!
//! ```rust
//! use sgnl_core::{FetchError, FetchErrorKind};
//!
//! let err = FetchError::Status { status: 503 };
//! assert_eq!(err.kind(), FetchErrorKind::HttpStatus);
//! assert!(err.to_string().contains("503"));
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a document could not be fetched.
///
/// Every variant is terminal for the URL it was raised for. The fetcher never
/// retries on its own; that decision belongs to whoever drives the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, DNS, TLS or body transfer failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured time budget.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status code.
    #[error("Server responded with HTTP status {status}")]
    Status { status: u16 },

    /// The response body exceeded the byte limit.
    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The redirect chain was longer than the configured hop limit.
    #[error("Too many redirects")]
    TooManyRedirects,

    /// The fetch was abandoned because the surrounding request was cancelled.
    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Returns the taxonomy code for this failure.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidUrl(_) => FetchErrorKind::InvalidUrl,
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Status { .. } => FetchErrorKind::HttpStatus,
            FetchError::TooLarge { .. } => FetchErrorKind::TooLarge,
            FetchError::TooManyRedirects => FetchErrorKind::RedirectLimit,
            FetchError::Cancelled => FetchErrorKind::Cancelled,
        }
    }

    /// Maps a reqwest error onto the fetch taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: u64) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { timeout }
        } else if err.is_redirect() {
            FetchError::TooManyRedirects
        } else if let Some(status) = err.status() {
            FetchError::Status { status: status.as_u16() }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Serializable taxonomy code carried in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus,
    TooLarge,
    RedirectLimit,
    Cancelled,
}

impl FetchErrorKind {
    /// Stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::InvalidUrl => "invalid_url",
            FetchErrorKind::Network => "network",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::HttpStatus => "http_status",
            FetchErrorKind::TooLarge => "too_large",
            FetchErrorKind::RedirectLimit => "redirect_limit",
            FetchErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Errors raised while setting up the scoring pipeline.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`crate::SignalConfig`].
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A keyword vocabulary could not be compiled into a matcher.
    #[error("Invalid vocabulary '{name}': {reason}")]
    InvalidVocabulary { name: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A CSS selector that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid selector: {0}")]
pub struct SelectorError(pub String);

/// Result type alias for [`SignalError`].
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::InvalidUrl("x".into()).kind(), FetchErrorKind::InvalidUrl);
        assert_eq!(FetchError::Network("x".into()).kind(), FetchErrorKind::Network);
        assert_eq!(FetchError::Timeout { timeout: 5 }.kind(), FetchErrorKind::Timeout);
        assert_eq!(FetchError::Status { status: 404 }.kind(), FetchErrorKind::HttpStatus);
        assert_eq!(FetchError::TooLarge { limit: 10 }.kind(), FetchErrorKind::TooLarge);
        assert_eq!(FetchError::TooManyRedirects.kind(), FetchErrorKind::RedirectLimit);
        assert_eq!(FetchError::Cancelled.kind(), FetchErrorKind::Cancelled);
    }

    #[test]
    fn test_timeout_error_message() {
        let err = FetchError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FetchErrorKind::HttpStatus).unwrap();
        assert_eq!(json, "\"http_status\"");
        assert_eq!(FetchErrorKind::RedirectLimit.as_str(), "redirect_limit");
    }

    #[test]
    fn test_selector_error_display() {
        let err = SelectorError("[[x: unexpected token".into());
        assert_eq!(err.to_string(), "Invalid selector: [[x: unexpected token");
    }

    #[test]
    fn test_vocabulary_error_display() {
        let err = SignalError::InvalidVocabulary { name: "hype".into(), reason: "empty".into() };
        assert!(err.to_string().contains("hype"));
    }
}
