//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Nobody is logged in.
    #[error("not logged in")]
    NotLoggedIn,

    /// The backend rejected the stored session.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Insufficient permissions.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Login or registration input rejected locally.
    #[error("{0}")]
    Validation(String),

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] basket_cache::CacheError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::NotLoggedIn | AuthError::SessionExpired
        )
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions)
    }
}
