//! REST backend client for Basket.
//!
//! This crate provides:
//! - `ApiClient` - `reqwest` client with bearer tokens and 401 handling
//! - Implementations of the `basket-commerce` backend traits
//!   (`CatalogBackend`, `CheckoutBackend`, `AdminBackend`)
//! - Login, registration and profile calls
//! - `TimeoutConfig` - Connect and total timeouts

mod admin;
mod auth;
mod catalog;
mod checkout;
mod client;
mod error;
mod timeout;

pub use auth::Registered;
pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::FetchError;
pub use timeout::{TimeoutConfig, DEFAULT_TIMEOUT};
