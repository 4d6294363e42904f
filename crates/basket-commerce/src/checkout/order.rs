//! Order types.
//!
//! The backend owns orders; these types mirror its records loosely enough
//! to survive the numeric/string drift in what it sends.

use crate::checkout::ShippingAddress;
use crate::ids::{OrderId, ProductId};
use crate::money::{self, Money};
use crate::wire;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// Statuses the storefront does not know are kept verbatim so an admin
/// reload never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
    /// Anything else the backend reports.
    Other(String),
}

impl OrderStatus {
    /// Statuses an admin can set.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(s) => s,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        OrderStatus::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Account details attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderCustomer {
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub phone: Option<String>,
}

/// An item in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, alias = "productName")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::de_int")]
    pub quantity: i64,
    /// Unit price at the time of purchase.
    #[serde(default, with = "money::wire")]
    pub price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity.max(0))
    }
}

/// A placed order as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number, when the backend assigns one.
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderItem>,
    #[serde(default, alias = "shippingAddress")]
    pub shipping: Option<ShippingAddress>,
    #[serde(default)]
    pub delivery_option: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "money::wire")]
    pub subtotal: Money,
    #[serde(default, alias = "shippingCost", with = "money::wire")]
    pub shipping_fee: Money,
    #[serde(default, with = "money::wire")]
    pub discount: Money,
    #[serde(default, alias = "totalAmount", with = "money::wire")]
    pub total: Money,
    #[serde(
        default,
        alias = "orderDate",
        deserialize_with = "wire::de_opt_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity.max(0)).sum()
    }

    /// Order number to print: the backend's, else `NN-<year>-<id>` with
    /// numeric ids padded to three digits.
    pub fn display_number(&self) -> String {
        if let Some(number) = self.order_number.as_deref().filter(|n| !n.trim().is_empty()) {
            return number.to_string();
        }
        let year = self.created_at.unwrap_or_else(Utc::now).year();
        let id = match self.id.as_str().parse::<u64>() {
            Ok(n) => format!("{:03}", n),
            Err(_) => self.id.to_string(),
        };
        format!("NN-{}-{}", year, id)
    }

    /// Shipping name, then account name.
    pub fn customer_name(&self) -> Option<&str> {
        self.shipping
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.user.as_ref().and_then(|u| u.name.as_deref()))
            .filter(|n| !n.trim().is_empty())
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .filter(|e| !e.trim().is_empty())
    }

    /// Shipping phone, then account phone.
    pub fn customer_phone(&self) -> Option<&str> {
        self.shipping
            .as_ref()
            .map(|s| s.phone.as_str())
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.user.as_ref().and_then(|u| u.phone.as_deref()))
            .filter(|p| !p.trim().is_empty())
    }
}

/// The backend's authoritative pricing of the drafted order (step 3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderReview {
    #[serde(default, alias = "cartItems")]
    pub items: Vec<OrderItem>,
    #[serde(default, with = "money::wire")]
    pub subtotal: Money,
    #[serde(default, alias = "shippingCost", with = "money::wire")]
    pub shipping_fee: Money,
    #[serde(default, with = "money::wire")]
    pub discount: Money,
    #[serde(default, with = "money::wire")]
    pub total: Money,
    #[serde(default, alias = "shippingAddress")]
    pub address: Option<ShippingAddress>,
    #[serde(default)]
    pub delivery_option: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Outcome of a successful place-order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: Order,
    /// Whether the notification channel accepted the message.
    pub notified: bool,
}

/// The signed-in shopper checkout acts on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Key for every checkout call.
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}
