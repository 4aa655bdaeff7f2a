//! Error types for remote API operations.
//!
//! Errors are categorized so callers can tell a user-fixable failure
//! (bad credentials, missing resource) from a transient one (network).
//! This crate never retries on its own.

use std::fmt;

/// Result type alias for remote API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of remote API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The addressed resource does not exist.
    NotFound,
    /// The API key was rejected.
    Unauthorized,
    /// The service answered with an error status or an error envelope.
    Server,
    /// Connection, TLS or timeout failure.
    Network,
    /// The response could not be decoded.
    Decode,
    /// The client is misconfigured.
    Config,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Authentication failed",
            Self::Server => "Remote service error",
            Self::Network => "Network connectivity issue",
            Self::Decode => "Unexpected response format",
            Self::Config => "Client configuration error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "The resource may have been deleted outside of this tool; run a refresh",
            Self::Unauthorized => "Check the API key (UPTIME_API_KEY) and its permissions",
            Self::Server => "Check the error message; the request may need fixing",
            Self::Network => "Check your internet connection and the base URL, then try again",
            Self::Decode => "The service returned data this client does not understand",
            Self::Config => "Set UPTIME_API_KEY or pass --api-key",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the remote API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resource does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Resource kind (monitor, contact, status page).
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service returned an error status or an error envelope.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message taken from the envelope, or the raw body.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Unauthorized(_) => ErrorCategory::Unauthorized,
            Error::Api { status: 404, .. } => ErrorCategory::NotFound,
            Error::Api { .. } => ErrorCategory::Server,
            Error::Transport(_) => ErrorCategory::Network,
            Error::Decode(_) => ErrorCategory::Decode,
            Error::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether the addressed resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(401 | 403) => {
                Self::Unauthorized("API key rejected".to_string())
            }
            ureq::Error::StatusCode(code) => Self::api(code, format!("HTTP {code}")),
            ureq::Error::Json(e) => Self::Decode(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
