//! Error types for ring-dl
//!
//! One `Error` enum covers the whole run. The variants double as the failure
//! classification the downloader reports per attempt: a `Remote` error means
//! the call reached the service and got an error response (with the response
//! body kept for diagnostics), `Network` covers transport failures that never
//! produced a response, and `Io` covers local filesystem faults. All three are
//! retried identically; the distinction only changes the reported message.

use thiserror::Error;

/// Result type alias for ring-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ring-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "username")
        key: Option<String>,
    },

    /// Authentication against the Ring service failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The service answered an otherwise well-formed request with an error
    /// status. The response body, when present, is carried for diagnostics.
    #[error("{}", remote_message(.status, .body))]
    Remote {
        /// HTTP status code of the error response
        status: u16,
        /// Response body, if one could be read
        body: Option<String>,
    },

    /// Transport-level failure: the request never produced a response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local I/O error (creating the output file, writing the recording)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A service URL could not be constructed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a [`Error::Config`] without an associated key
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: None,
        }
    }

    /// Shorthand for a [`Error::Config`] tied to a specific setting
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

fn remote_message(status: &u16, body: &Option<String>) -> String {
    match body {
        Some(body) => format!("server returned {status} - {body}"),
        None => format!("server returned {status}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_display_includes_body() {
        let err = Error::Remote {
            status: 404,
            body: Some("recording not ready".to_string()),
        };
        assert_eq!(err.to_string(), "server returned 404 - recording not ready");
    }

    #[test]
    fn remote_error_display_without_body() {
        let err = Error::Remote {
            status: 500,
            body: None,
        };
        assert_eq!(err.to_string(), "server returned 500");
    }

    #[test]
    fn config_error_display_uses_message() {
        let err = Error::config_key("-username is required", "username");
        assert_eq!(err.to_string(), "configuration error: -username is required");
    }

    #[test]
    fn io_error_converts_via_from() {
        let err: Error = std::io::Error::other("disk fail").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("disk fail"));
    }
}
