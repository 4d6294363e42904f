//! Product catalog module.
//!
//! Contains types for products, variants and categories, plus the
//! normalization and image helpers applied to backend records.

mod category;
mod image;
mod normalize;
mod product;
mod search;

pub use category::{Category, CategoryPayload};
pub use image::{resolve_image_url, PLACEHOLDER_IMAGE, PRODUCT_IMAGE_ROUTE};
pub use normalize::{normalize_product, normalize_products};
pub use product::{Product, ProductVariant, StockLevel};
pub use search::{active_only, suggestions, MAX_SUGGESTIONS, MIN_SUGGESTION_QUERY};
