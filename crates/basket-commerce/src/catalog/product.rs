//! Product and variant types.

use crate::cart::{CartItem, LineItemKey};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{self, Money};
use serde::{Deserialize, Serialize};

/// How many units of a product or variant can be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// The backend did not report stock; treat as unlimited.
    Unlimited,
    /// Explicit stock count, never negative.
    Limited(i64),
}

impl StockLevel {
    /// Build from an optional reported count, clamping negatives to zero.
    pub fn from_reported(stock: Option<i64>) -> Self {
        match stock {
            Some(n) => StockLevel::Limited(n.max(0)),
            None => StockLevel::Unlimited,
        }
    }

    /// The purchase cap, if any.
    pub fn cap(&self) -> Option<i64> {
        match self {
            StockLevel::Unlimited => None,
            StockLevel::Limited(n) => Some(*n),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, StockLevel::Limited(0))
    }
}

/// A purchasable variant, labelled by pack weight ("250g", "1kg").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Display label; also the cart variant key.
    pub label: String,
    #[serde(with = "money::wire")]
    pub price: Money,
    #[serde(default, with = "money::wire::option")]
    pub sale_price: Option<Money>,
    #[serde(default, with = "money::wire::option")]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend product identifier.
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// List price.
    #[serde(with = "money::wire")]
    pub price: Money,
    /// Promotional price, when lower than `price`.
    #[serde(default, with = "money::wire::option")]
    pub sale_price: Option<Money>,
    /// MRP shown struck through.
    #[serde(default, with = "money::wire::option")]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Pack size, e.g. "500g".
    #[serde(default)]
    pub weight: Option<String>,
    /// `None` means the backend does not track stock for this product.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// Explicit availability flag; `false` overrides any stock count.
    #[serde(default = "default_true")]
    pub in_stock: bool,
    /// Inactive products are hidden from the storefront.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Image reference as stored by the backend (not yet resolved).
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Look up a variant by label, or the first variant when `label` is `None`.
    pub fn variant(&self, label: Option<&str>) -> Option<&ProductVariant> {
        match label {
            Some(label) => self
                .variants
                .iter()
                .find(|v| v.label.eq_ignore_ascii_case(label)),
            None => self.variants.first(),
        }
    }

    /// Stock for the chosen variant, falling back to the product count.
    pub fn stock_level(&self, variant: Option<&ProductVariant>) -> StockLevel {
        StockLevel::from_reported(variant.and_then(|v| v.stock).or(self.stock_quantity))
    }

    pub fn is_in_stock(&self, variant: Option<&ProductVariant>) -> bool {
        self.in_stock && self.stock_level(variant).is_available()
    }

    /// The price a customer pays right now.
    ///
    /// Zero amounts count as "not set" so a missing sale price falls
    /// through to the list price.
    pub fn current_price(&self, variant: Option<&ProductVariant>) -> Money {
        let set = |m: Option<Money>| m.filter(|m| !m.is_zero());
        variant
            .and_then(|v| set(v.sale_price).or(set(Some(v.price))))
            .or(set(self.sale_price))
            .unwrap_or(self.price)
    }

    /// The struck-through reference price, if any.
    pub fn reference_price(&self, variant: Option<&ProductVariant>) -> Option<Money> {
        variant
            .and_then(|v| v.original_price)
            .or(self.original_price)
            .filter(|m| m.is_positive())
    }

    /// Whole-percent saving of the current price against the reference price.
    pub fn savings_percent(&self, variant: Option<&ProductVariant>) -> u32 {
        let current = self.current_price(variant);
        match self.reference_price(variant) {
            Some(original) if current.is_positive() && original.amount_minor > current.amount_minor => {
                let saved = (original.amount_minor - current.amount_minor) as f64;
                (saved / original.amount_minor as f64 * 100.0).round() as u32
            }
            _ => 0,
        }
    }

    /// Build a cart line for this product.
    ///
    /// `variant_label` selects a variant; products without variants use the
    /// default line. The stock cap travels with the line so the cart can
    /// enforce it without another lookup.
    pub fn to_cart_item(
        &self,
        variant_label: Option<&str>,
        quantity: i64,
    ) -> Result<CartItem, CommerceError> {
        let variant = match variant_label {
            Some(label) => Some(
                self.variant(Some(label))
                    .ok_or_else(|| CommerceError::validation(format!("{} has no {} option", self.name, label)))?,
            ),
            None => self.variant(None),
        };

        if !self.is_in_stock(variant) {
            return Err(CommerceError::OutOfStock(self.name.clone()));
        }

        let label = variant.map(|v| v.label.clone());
        Ok(CartItem {
            key: LineItemKey::new(&self.id, label.as_deref()),
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.current_price(variant),
            original_unit_price: self.reference_price(variant),
            quantity,
            variant_label: label,
            category: self.category.clone(),
            brand: self.brand.clone(),
            stock_cap: self.stock_level(variant).cap(),
            image_url: self.image_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghee() -> Product {
        Product {
            id: ProductId::new("7"),
            name: "A2 Cow Ghee".to_string(),
            description: "Bilona churned".to_string(),
            price: Money::inr(1200),
            sale_price: Some(Money::inr(999)),
            original_price: Some(Money::inr(1200)),
            category: Some("ghee".to_string()),
            subcategory: None,
            brand: Some("Neenu's Natural".to_string()),
            weight: Some("500ml".to_string()),
            stock_quantity: Some(3),
            in_stock: true,
            is_active: true,
            image_url: Some("ghee.jpg".to_string()),
            rating: 4.5,
            review_count: 12,
            ingredients: vec!["A2 milk".to_string()],
            benefits: vec![],
            variants: vec![],
        }
    }

    #[test]
    fn test_stock_level() {
        let mut p = ghee();
        assert_eq!(p.stock_level(None), StockLevel::Limited(3));

        p.stock_quantity = None;
        assert_eq!(p.stock_level(None), StockLevel::Unlimited);
        assert!(p.is_in_stock(None));

        p.stock_quantity = Some(-4);
        assert_eq!(p.stock_level(None), StockLevel::Limited(0));
        assert!(!p.is_in_stock(None));
    }

    #[test]
    fn test_in_stock_flag_overrides_count() {
        let mut p = ghee();
        p.in_stock = false;
        assert!(!p.is_in_stock(None));
    }

    #[test]
    fn test_variant_stock_wins() {
        let mut p = ghee();
        p.variants = vec![ProductVariant {
            label: "1L".to_string(),
            price: Money::inr(1900),
            sale_price: None,
            original_price: None,
            stock: Some(0),
        }];
        let v = p.variant(None);
        assert_eq!(p.stock_level(v), StockLevel::Limited(0));
        assert_eq!(p.current_price(v), Money::inr(1900));
    }

    #[test]
    fn test_savings_percent() {
        let p = ghee();
        // (1200 - 999) / 1200 = 16.75%
        assert_eq!(p.savings_percent(None), 17);

        let mut no_ref = ghee();
        no_ref.original_price = None;
        assert_eq!(no_ref.savings_percent(None), 0);
    }

    #[test]
    fn test_to_cart_item_carries_cap() {
        let item = ghee().to_cart_item(None, 1).unwrap();
        assert_eq!(item.key.as_str(), "7-default");
        assert_eq!(item.unit_price, Money::inr(999));
        assert_eq!(item.stock_cap, Some(3));
    }

    #[test]
    fn test_to_cart_item_out_of_stock() {
        let mut p = ghee();
        p.stock_quantity = Some(0);
        assert!(matches!(
            p.to_cart_item(None, 1),
            Err(CommerceError::OutOfStock(_))
        ));
    }

    #[test]
    fn test_to_cart_item_unknown_variant() {
        assert!(ghee().to_cart_item(Some("5kg"), 1).is_err());
    }
}
