//! Commerce error types.

use thiserror::Error;

/// Errors raised by local commerce rules (cart, coupons, checkout steps).
///
/// None of these involve the network; they are the "validation" class of
/// failure and are always recoverable by correcting input.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Product cannot be bought right now.
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    /// Line already holds every unit in stock.
    #[error("Only {cap} of {name} in stock")]
    StockLimitReached { name: String, cap: i64 },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// Draft was already turned into an order.
    #[error("Order {0} was already submitted")]
    AlreadySubmitted(String),

    /// Unknown coupon code.
    #[error("Invalid discount code: {0}")]
    InvalidDiscountCode(String),

    /// Coupon exists but the cart does not qualify.
    #[error("Coupon {code} requires a subtotal of at least {minimum}")]
    CouponNotEligible { code: String, minimum: String },

    /// Persisting client state failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CommerceError {
    /// Convenience constructor for form validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        CommerceError::ValidationError(msg.into())
    }
}

impl From<basket_cache::CacheError> for CommerceError {
    fn from(e: basket_cache::CacheError) -> Self {
        CommerceError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
