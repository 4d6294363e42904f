//! Admin console: product, order and category management plus invoices.

mod console;
mod filter;
mod form;
mod invoice;

pub use console::{CategoryConsole, OrderConsole, ProductConsole};
pub use filter::{CategoryFilter, OrderFilter, ProductFilter};
pub use form::{FormMode, ImageUpload, ProductForm, ProductPayload, DEFAULT_RATING};
pub use invoice::{Invoice, InvoiceDesk, InvoiceLine, InvoiceSettings};

use thiserror::Error;

use crate::backend::BackendError;
use crate::error::CommerceError;

/// Errors from admin actions.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Form input rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] CommerceError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Work for this order is already running.
    #[error("Order {0} is already being processed")]
    Busy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    /// Check if the caller must log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AdminError::Backend(e) if e.is_auth_failure())
    }
}
