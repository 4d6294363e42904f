//! Cart state and its mutation rules.

use crate::cart::{CartItem, LineItemKey};
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A shopping cart.
///
/// Invariant: every line has `1 <= quantity`, and `quantity <= stock_cap`
/// whenever the line carries a cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,
    /// Unix timestamp of last change.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, merging with an existing line for the same product and variant.
    ///
    /// Quantities above the stock cap are clamped to the cap. Returns an
    /// error if:
    /// - Quantity is not positive
    /// - The line already holds every unit in stock
    /// - The product is out of stock
    /// - The result would exceed MAX_QUANTITY_PER_ITEM
    pub fn add_item(&mut self, item: CartItem) -> Result<LineItemKey, CommerceError> {
        if item.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.key == item.key) {
            // Newer product data wins for price and stock.
            let cap = item.stock_cap.or(existing.stock_cap);
            if let Some(cap) = cap {
                if existing.quantity >= cap {
                    return Err(CommerceError::StockLimitReached {
                        name: existing.display_name(),
                        cap,
                    });
                }
            }

            let wanted = existing.quantity.saturating_add(item.quantity);
            let new_quantity = clamp_to_cap(wanted, cap);
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            existing.stock_cap = cap;
            existing.unit_price = item.unit_price;
            existing.original_unit_price = item.original_unit_price;
            self.updated_at = current_timestamp();
            return Ok(existing.key.clone());
        }

        if item.stock_cap.is_some_and(|cap| cap <= 0) {
            return Err(CommerceError::OutOfStock(item.display_name()));
        }

        let quantity = clamp_to_cap(item.quantity, item.stock_cap);
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let key = item.key.clone();
        self.items.push(CartItem { quantity, ..item });
        self.updated_at = current_timestamp();
        Ok(key)
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Asking for more than the
    /// stock cap is rejected rather than clamped, since the caller asked for
    /// an exact number.
    pub fn update_quantity(&mut self, key: &LineItemKey, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return if self.remove_item(key) {
                Ok(())
            } else {
                Err(CommerceError::ItemNotInCart(key.to_string()))
            };
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| &i.key == key)
            .ok_or_else(|| CommerceError::ItemNotInCart(key.to_string()))?;

        if let Some(cap) = item.stock_cap {
            if quantity > cap {
                return Err(CommerceError::StockLimitReached {
                    name: item.display_name(),
                    cap,
                });
            }
        }

        item.quantity = quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Remove a line from the cart.
    pub fn remove_item(&mut self, key: &LineItemKey) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.key != key);
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }

    /// Get total item count (sum of quantities), as shown on the cart badge.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by key.
    pub fn get_item(&self, key: &LineItemKey) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.key == key)
    }

    /// Total saving against reference prices across all lines.
    pub fn savings(&self) -> Money {
        self.items.iter().map(CartItem::line_savings).sum()
    }
}

fn clamp_to_cap(quantity: i64, cap: Option<i64>) -> i64 {
    match cap {
        Some(cap) => quantity.min(cap),
        None => quantity,
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
