//! HTTP client error types.

use basket_auth::AuthError;
use basket_commerce::backend::BackendError;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Failed to send the request or read the reply.
    #[error("Request failed: {0}")]
    Request(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// 401. The stored session has already been dropped.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Any other non-2xx reply.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Failed to parse response body.
    #[error("Failed to parse response from {context}: {message}")]
    Parse { context: String, message: String },

    /// Login or session bookkeeping failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl FetchError {
    /// Check if the caller must log in again.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            FetchError::Unauthorized => true,
            FetchError::Auth(e) => e.is_auth_failure(),
            _ => false,
        }
    }

    pub(crate) fn parse(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FetchError::Parse {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::parse(
                e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                e,
            )
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

impl From<FetchError> for BackendError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Unauthorized => BackendError::Unauthorized,
            FetchError::Http { status, message } => BackendError::Status { status, message },
            FetchError::Parse { .. } => BackendError::Decode(e.to_string()),
            FetchError::Auth(inner) if inner.is_auth_failure() => BackendError::Unauthorized,
            other => BackendError::Transport(other.to_string()),
        }
    }
}
