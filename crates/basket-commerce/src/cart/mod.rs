//! Shopping cart module.
//!
//! Contains cart lines, the persisted cart store, coupons and the pricing
//! calculator.

mod cart;
mod coupon;
mod item;
mod pricing;
mod store;

pub use cart::{Cart, MAX_QUANTITY_PER_ITEM};
pub use coupon::{Coupon, CouponBook, CouponKind};
pub use item::{CartItem, LineItemKey};
pub use pricing::{compute_discount, compute_subtotal, compute_total, CartTotals, PricingPolicy};
pub use store::CartStore;
