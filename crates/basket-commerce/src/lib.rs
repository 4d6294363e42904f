//! Storefront domain types and logic for Basket.
//!
//! - **Catalog**: products, variants, categories, backend record normalization
//! - **Cart**: cart lines, the persisted cart store, coupons, pricing
//! - **Checkout**: four-step sequencer, order draft, order placement
//! - **Notify**: best-effort order notifications (WhatsApp links)
//! - **Admin**: product/order/category consoles, product form, invoices
//!
//! Network access goes through the traits in [`backend`]; this crate never
//! talks HTTP itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use basket_commerce::prelude::*;
//!
//! let cart = Arc::new(CartStore::open(cache, owner)?);
//! cart.add(product.to_cart_item(None, 2)?)?;
//!
//! let checkout = CheckoutSession::start(Some(customer), cart, backend, notifier, config)?;
//! checkout.submit_address(ShippingSelection::New(address)).await?;
//! checkout.submit_delivery_payment(DeliveryOption::standard(), PaymentMethod::Cod).await?;
//! checkout.confirm_review().await?;
//! let placed = checkout.place_order().await?;
//! println!("Order {} placed", placed.order.display_number());
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod wire;

pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Category, CategoryPayload, Product, ProductVariant, StockLevel};

    // Cart
    pub use crate::cart::{
        Cart, CartItem, CartStore, CartTotals, Coupon, CouponBook, CouponKind, LineItemKey,
        PricingPolicy,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutConfig, CheckoutError, CheckoutSession, CheckoutStep, Customer, DeliveryOption,
        Order, OrderReview, OrderStatus, PaymentMethod, PlacedOrder, ShippingAddress,
        ShippingSelection,
    };

    // Backend seams
    pub use crate::backend::{AdminBackend, BackendError, CatalogBackend, CheckoutBackend};

    // Notify
    pub use crate::notify::{GeoLocation, NotificationChannel, OrderNotification, WhatsAppChannel};

    // Admin
    pub use crate::admin::{
        AdminError, CategoryConsole, FormMode, ImageUpload, InvoiceDesk, OrderConsole,
        ProductConsole, ProductForm, ProductPayload,
    };
}
