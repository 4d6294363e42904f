//! Money type for representing monetary values.
//!
//! Uses an integer count of the currency's minor unit (paise for INR) to
//! avoid floating-point drift when summing line items. Floats only appear
//! at the wire boundary, see [`wire`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
        }
    }

    /// Number of minor units in one major unit.
    pub fn minor_per_major(&self) -> i64 {
        100
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// All arithmetic saturates instead of overflowing; the result keeps the
/// currency of the left-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a rupee amount from whole rupees.
    ///
    /// ```
    /// use basket_commerce::money::Money;
    /// assert_eq!(Money::inr(959).amount_minor, 95_900);
    /// ```
    pub fn inr(rupees: i64) -> Self {
        Self::new(rupees.saturating_mul(100), Currency::INR)
    }

    /// Create a Money value from a decimal amount.
    ///
    /// Non-finite input yields zero.
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        if !amount.is_finite() {
            return Self::zero(currency);
        }
        let minor = (amount * currency.minor_per_major() as f64).round();
        Self::new(minor as i64, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Clamp negative amounts to zero.
    pub fn non_negative(&self) -> Self {
        Self::new(self.amount_minor.max(0), self.currency)
    }

    /// The smaller of two amounts.
    pub fn min(self, other: Money) -> Money {
        if other.amount_minor < self.amount_minor {
            Money::new(other.amount_minor, self.currency)
        } else {
            self
        }
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_major() as f64
    }

    /// Format as a display string (e.g., "₹959.00").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "959.00").
    pub fn display_amount(&self) -> String {
        let per = self.currency.minor_per_major();
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / per as u64, abs % per as u64)
    }

    /// Saturating multiplication by a quantity.
    pub fn multiply(&self, factor: i64) -> Money {
        Money::new(self.amount_minor.saturating_mul(factor), self.currency)
    }

    /// Calculate a whole-number percentage of this amount, rounded half up.
    pub fn percentage(&self, percent: u32) -> Money {
        let scaled = i128::from(self.amount_minor) * i128::from(percent);
        let rounded = (scaled + 50).div_euclid(100);
        let clamped = rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        Money::new(clamped, self.currency)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_minor.saturating_add(other.amount_minor), self.currency)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(self.amount_minor.saturating_sub(other.amount_minor), self.currency)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        self.multiply(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        let mut iter = iter.peekable();
        let currency = iter.peek().map(|m| m.currency).unwrap_or_default();
        iter.fold(Money::zero(currency), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Serde adapters for amounts as the backend sends them.
///
/// The backend speaks decimal rupees and is inconsistent about types:
/// numbers, numeric strings, `null` and garbage all occur. Anything that
/// does not parse becomes zero.
pub mod wire {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Read a lenient decimal amount.
    pub fn from_value(value: &Value) -> Option<Money> {
        let amount = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        amount
            .is_finite()
            .then(|| Money::from_decimal(amount, Currency::INR))
    }

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(from_value(&value).unwrap_or_default())
    }

    /// Same as the parent module, for optional amounts.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            money: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match money {
                Some(m) => serializer.serialize_some(&m.to_decimal()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            let value = Value::deserialize(deserializer)?;
            Ok(from_value(&value))
        }
    }
}
