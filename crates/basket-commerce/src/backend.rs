//! Seams to the REST backend.
//!
//! Domain code talks to these traits; `basket-data` implements them over
//! HTTP and tests implement them in memory.

use async_trait::async_trait;
use thiserror::Error;

use crate::admin::{ImageUpload, ProductPayload};
use crate::catalog::{Category, CategoryPayload, Product};
use crate::checkout::{CheckoutSelection, Order, OrderReview, OrderStatus};
use crate::ids::{CategoryId, OrderId, ProductId};

/// A failed backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// 401: the session is no longer valid.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Any other non-2xx reply.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Request never got a reply.
    #[error("Network error: {0}")]
    Transport(String),

    /// Reply did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        BackendError::Status {
            status,
            message: message.into(),
        }
    }

    /// Check if the caller must log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, BackendError::Unauthorized)
    }
}

/// Checkout endpoints, all keyed by the customer's email.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// Persist one step's selection.
    async fn save_selection(
        &self,
        email: &str,
        selection: &CheckoutSelection,
    ) -> Result<(), BackendError>;

    /// Fetch the authoritative review of the drafted order.
    async fn review(&self, email: &str) -> Result<OrderReview, BackendError>;

    /// Turn the drafted order into a real one.
    async fn place_order(&self, email: &str) -> Result<Order, BackendError>;
}

/// Public catalog reads.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError>;

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError>;

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, BackendError>;

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;

    async fn get_category(&self, id: &CategoryId) -> Result<Category, BackendError>;
}

/// Admin endpoints.
#[async_trait]
pub trait AdminBackend: CatalogBackend {
    /// Every product, including inactive ones.
    async fn admin_products(&self) -> Result<Vec<Product>, BackendError>;

    /// JSON body, or multipart with an image.
    async fn create_product(
        &self,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<Product, BackendError>;

    async fn update_product(
        &self,
        id: &ProductId,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<Product, BackendError>;

    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError>;

    async fn list_orders(&self) -> Result<Vec<Order>, BackendError>;

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: &OrderStatus,
    ) -> Result<(), BackendError>;

    async fn create_category(&self, category: &CategoryPayload) -> Result<Category, BackendError>;

    async fn update_category(
        &self,
        id: &CategoryId,
        category: &CategoryPayload,
    ) -> Result<Category, BackendError>;

    async fn delete_category(&self, id: &CategoryId) -> Result<(), BackendError>;
}
