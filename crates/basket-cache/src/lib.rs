//! Persisted client state for the Basket storefront.
//!
//! Provides a small typed key-value store with automatic JSON serialization,
//! backed either by memory (tests, one-shot runs) or by a directory of JSON
//! files (the CLI profile directory).
//!
//! # Example
//!
//! ```rust,ignore
//! use basket_cache::Cache;
//!
//! let cache = Cache::open("/home/me/.local/share/basket")?;
//!
//! // Store a value
//! cache.set("cart:sess_abc", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Cart> = cache.get("cart:sess_abc")?;
//!
//! // Delete a value
//! cache.delete("cart:sess_abc")?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionData, SessionId};
}
