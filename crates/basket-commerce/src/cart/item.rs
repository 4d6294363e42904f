//! Cart line items.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant segment used when a line has no variant.
const DEFAULT_VARIANT: &str = "default";

/// Identity of a cart line: one per (product, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemKey(String);

impl LineItemKey {
    /// Build the key for a product and optional variant label.
    pub fn new(product_id: &ProductId, variant_label: Option<&str>) -> Self {
        let variant = variant_label
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VARIANT);
        Self(format!("{}-{}", product_id, variant))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineItemKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One product + variant entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Line identity, derived from product and variant.
    pub key: LineItemKey,
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    pub unit_price: Money,
    /// Struck-through MRP, when the product has one.
    pub original_unit_price: Option<Money>,
    /// Always at least 1 while the line exists.
    pub quantity: i64,
    pub variant_label: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Units in stock when the line was last touched; `None` is unlimited.
    pub stock_cap: Option<i64>,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity.max(0))
    }

    /// Saving against the reference price for the whole line.
    pub fn line_savings(&self) -> Money {
        match self.original_unit_price {
            Some(original) if original.amount_minor > self.unit_price.amount_minor => {
                (original - self.unit_price).multiply(self.quantity.max(0))
            }
            _ => Money::zero(self.unit_price.currency),
        }
    }

    /// Display name including the variant, e.g. "Ghee (500ml)".
    pub fn display_name(&self) -> String {
        match &self.variant_label {
            Some(v) => format!("{} ({})", self.name, v),
            None => self.name.clone(),
        }
    }
}
