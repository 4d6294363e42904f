//! Coupons and the auto-apply rule.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Discount effect of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponKind {
    /// Whole-number percentage off the subtotal.
    Percentage(u32),
    /// Fixed amount off, never more than the subtotal.
    Fixed(Money),
}

/// A discount code with an eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Code as the customer types it; matched case-insensitively.
    pub code: String,
    pub kind: CouponKind,
    /// Subtotal the cart must reach for the coupon to take effect.
    pub minimum_subtotal: Money,
    /// Applied without the customer typing the code.
    #[serde(default)]
    pub auto_apply: bool,
}

impl Coupon {
    /// The storefront's standing offer: 10% off orders of ₹1499 or more.
    pub fn flat10() -> Self {
        Self {
            code: "FLAT10".to_string(),
            kind: CouponKind::Percentage(10),
            minimum_subtotal: Money::inr(1499),
            auto_apply: true,
        }
    }

    pub fn is_eligible(&self, subtotal: Money) -> bool {
        subtotal.amount_minor >= self.minimum_subtotal.amount_minor
    }

    /// Discount this coupon gives on `subtotal`; zero when not eligible.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if !self.is_eligible(subtotal) || !subtotal.is_positive() {
            return Money::zero(subtotal.currency);
        }
        match self.kind {
            CouponKind::Percentage(pct) => subtotal.percentage(pct.min(100)),
            CouponKind::Fixed(amount) => amount.non_negative().min(subtotal),
        }
    }

    /// Short human description, e.g. "10% off".
    pub fn describe(&self) -> String {
        match self.kind {
            CouponKind::Percentage(pct) => format!("{}% off", pct),
            CouponKind::Fixed(amount) => format!("{} off", amount.display()),
        }
    }
}

/// The coupons a storefront accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl Default for CouponBook {
    fn default() -> Self {
        Self::new(vec![Coupon::flat10()])
    }
}

impl CouponBook {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    /// Find a coupon by code, ignoring case.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim();
        self.coupons.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Check a typed code against the current subtotal.
    pub fn validate(&self, code: &str, subtotal: Money) -> Result<&Coupon, CommerceError> {
        let coupon = self
            .find(code)
            .ok_or_else(|| CommerceError::InvalidDiscountCode(code.trim().to_string()))?;
        if !coupon.is_eligible(subtotal) {
            return Err(CommerceError::CouponNotEligible {
                code: coupon.code.clone(),
                minimum: coupon.minimum_subtotal.display(),
            });
        }
        Ok(coupon)
    }

    /// Apply the first eligible auto-apply coupon if none is applied yet.
    ///
    /// Returns the code that was applied by this call, if any. Calling it
    /// again with the same state is a no-op.
    pub fn auto_apply(&self, subtotal: Money, applied: &mut Option<String>) -> Option<String> {
        if applied.is_some() {
            return None;
        }
        let coupon = self
            .coupons
            .iter()
            .find(|c| c.auto_apply && c.is_eligible(subtotal))?;
        *applied = Some(coupon.code.clone());
        Some(coupon.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat10_threshold() {
        let c = Coupon::flat10();
        assert!(!c.is_eligible(Money::inr(1498)));
        assert!(c.is_eligible(Money::inr(1499)));
        assert_eq!(c.discount_for(Money::inr(1600)), Money::inr(160));
        assert!(c.discount_for(Money::inr(959)).is_zero());
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let c = Coupon {
            code: "WELCOME100".to_string(),
            kind: CouponKind::Fixed(Money::inr(100)),
            minimum_subtotal: Money::inr(0),
            auto_apply: false,
        };
        assert_eq!(c.discount_for(Money::inr(60)), Money::inr(60));
        assert_eq!(c.discount_for(Money::inr(500)), Money::inr(100));
    }

    #[test]
    fn test_auto_apply_is_idempotent() {
        let book = CouponBook::default();
        let mut applied = None;

        assert_eq!(book.auto_apply(Money::inr(1600), &mut applied), Some("FLAT10".to_string()));
        assert_eq!(book.auto_apply(Money::inr(1600), &mut applied), None);
        assert_eq!(applied.as_deref(), Some("FLAT10"));
    }

    #[test]
    fn test_auto_apply_below_threshold() {
        let book = CouponBook::default();
        let mut applied = None;
        assert_eq!(book.auto_apply(Money::inr(959), &mut applied), None);
        assert!(applied.is_none());
    }

    #[test]
    fn test_auto_apply_respects_existing_coupon() {
        let book = CouponBook::default();
        let mut applied = Some("MANUAL".to_string());
        assert_eq!(book.auto_apply(Money::inr(5000), &mut applied), None);
        assert_eq!(applied.as_deref(), Some("MANUAL"));
    }

    #[test]
    fn test_first_eligible_wins() {
        let bigger = Coupon {
            code: "BIG20".to_string(),
            kind: CouponKind::Percentage(20),
            minimum_subtotal: Money::inr(1000),
            auto_apply: true,
        };
        let book = CouponBook::new(vec![Coupon::flat10(), bigger]);
        let mut applied = None;
        book.auto_apply(Money::inr(2000), &mut applied);
        assert_eq!(applied.as_deref(), Some("FLAT10"));
    }

    #[test]
    fn test_validate() {
        let book = CouponBook::default();
        assert!(book.validate("flat10", Money::inr(1500)).is_ok());
        assert!(matches!(
            book.validate("flat10", Money::inr(100)),
            Err(CommerceError::CouponNotEligible { .. })
        ));
        assert!(matches!(
            book.validate("BOGUS", Money::inr(100)),
            Err(CommerceError::InvalidDiscountCode(_))
        ));
    }
}
