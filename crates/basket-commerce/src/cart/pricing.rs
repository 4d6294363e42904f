//! Cart pricing calculations.
//!
//! Pure functions; totals are recomputed from the cart every time they are
//! shown rather than cached.

use crate::cart::{CartItem, Coupon};
use crate::checkout::DeliveryOption;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Shipping rules for carts without an explicitly priced delivery option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Orders at or above this subtotal ship free.
    pub free_shipping_threshold: Money,
    /// Fee charged below the threshold.
    pub flat_shipping_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::inr(499),
            flat_shipping_fee: Money::inr(49),
        }
    }
}

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    /// `max(0, subtotal + shipping - discount)`.
    pub total: Money,
    /// Coupon the discount came from, if one is applied.
    pub coupon: Option<String>,
}

impl CartTotals {
    /// Check if any discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Sum of unit price times quantity.
///
/// Prices and quantities that were unreadable on the wire arrive here as
/// zero and simply contribute nothing.
pub fn compute_subtotal(items: &[CartItem]) -> Money {
    let currency = items
        .first()
        .map(|i| i.unit_price.currency)
        .unwrap_or(Currency::INR);
    items
        .iter()
        .fold(Money::zero(currency), |acc, item| acc + item.line_total())
}

/// Discount for the applied coupon; zero when the cart does not qualify.
pub fn compute_discount(subtotal: Money, coupon: Option<&Coupon>) -> Money {
    coupon
        .map(|c| c.discount_for(subtotal))
        .unwrap_or_else(|| Money::zero(subtotal.currency))
}

/// Grand total, clamped so a large discount never produces a negative bill.
pub fn compute_total(subtotal: Money, shipping: Money, discount: Money) -> Money {
    (subtotal + shipping - discount).non_negative()
}

impl PricingPolicy {
    /// Shipping fee: an explicitly priced delivery option wins (even when
    /// it is free); otherwise the free-shipping tier applies.
    pub fn compute_shipping(&self, subtotal: Money, delivery: Option<&DeliveryOption>) -> Money {
        if let Some(price) = delivery.and_then(|d| d.price) {
            return price.non_negative();
        }
        if subtotal.amount_minor >= self.free_shipping_threshold.amount_minor {
            Money::zero(subtotal.currency)
        } else {
            self.flat_shipping_fee
        }
    }

    /// How much more the customer must add for free shipping.
    pub fn remaining_for_free_shipping(&self, subtotal: Money) -> Option<Money> {
        let remaining = self.free_shipping_threshold - subtotal;
        remaining.is_positive().then_some(remaining)
    }

    /// Full breakdown for a set of lines.
    pub fn totals(
        &self,
        items: &[CartItem],
        delivery: Option<&DeliveryOption>,
        coupon: Option<&Coupon>,
    ) -> CartTotals {
        let subtotal = compute_subtotal(items);
        let shipping = self.compute_shipping(subtotal, delivery);
        let discount = compute_discount(subtotal, coupon);
        CartTotals {
            subtotal,
            shipping,
            discount,
            total: compute_total(subtotal, shipping, discount),
            coupon: coupon.map(|c| c.code.clone()),
        }
    }
}
