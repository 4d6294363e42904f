//! Checkout error types.

use crate::backend::BackendError;
use crate::error::CommerceError;
use thiserror::Error;

/// How a checkout failure should be handled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input; fix it and retry. Nothing was sent.
    Validation,
    /// The backend refused or could not be reached; retry allowed.
    Backend,
    /// Session is gone; send the user to login.
    Auth,
    /// Same action already running; ignore.
    Busy,
}

/// Errors from the checkout sequencer.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Please log in to check out")]
    NotAuthenticated,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("That step is already being processed")]
    InFlight,

    #[error("Order {0} has already been placed")]
    Completed(String),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::NotAuthenticated => ErrorKind::Auth,
            CheckoutError::Backend(e) if e.is_auth_failure() => ErrorKind::Auth,
            CheckoutError::Backend(_) => ErrorKind::Backend,
            CheckoutError::InFlight => ErrorKind::Busy,
            CheckoutError::EmptyCart
            | CheckoutError::Commerce(_)
            | CheckoutError::Completed(_) => ErrorKind::Validation,
        }
    }

    /// Check if the caller must log in again.
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}
