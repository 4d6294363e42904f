//! Delivery, payment and the selection payloads saved at each step.

use crate::checkout::ShippingAddress;
use crate::ids::AddressId;
use crate::money::{self, Money};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A delivery speed the customer can pick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryOption {
    /// Backend identifier ("standard", "express").
    pub id: String,
    pub label: String,
    /// Explicit fee. `None` defers to the free-shipping rule.
    #[serde(default, with = "money::wire::option")]
    pub price: Option<Money>,
}

impl DeliveryOption {
    /// Standard delivery, priced by the free-shipping rule.
    pub fn standard() -> Self {
        Self {
            id: "standard".to_string(),
            label: "Standard Delivery (3-5 days)".to_string(),
            price: None,
        }
    }

    /// Express delivery at a fixed fee.
    pub fn express(price: Money) -> Self {
        Self {
            id: "express".to_string(),
            label: "Express Delivery (1-2 days)".to_string(),
            price: Some(price),
        }
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Card,
    Upi,
    Wallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cod,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Wallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery",
            PaymentMethod::Card => "Credit / Debit Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Wallet => "Wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" => Ok(PaymentMethod::Cod),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq)]
pub enum ShippingSelection {
    /// An address already saved on the account.
    Saved {
        id: AddressId,
        /// Copy kept for display and the notification message.
        address: ShippingAddress,
    },
    /// An address typed in during checkout.
    New(ShippingAddress),
}

impl ShippingSelection {
    pub fn address(&self) -> &ShippingAddress {
        match self {
            ShippingSelection::Saved { address, .. } => address,
            ShippingSelection::New(address) => address,
        }
    }
}

/// Body of a `saveSelection` call. Each step sends only its own fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CheckoutSelection {
    SavedAddress {
        #[serde(rename = "addressId")]
        address_id: AddressId,
    },
    NewAddress {
        address: ShippingAddress,
    },
    DeliveryPayment {
        #[serde(rename = "deliveryOption")]
        delivery_option: String,
        #[serde(rename = "paymentMethod")]
        payment_method: PaymentMethod,
    },
}

impl From<&ShippingSelection> for CheckoutSelection {
    fn from(selection: &ShippingSelection) -> Self {
        match selection {
            ShippingSelection::Saved { id, .. } => CheckoutSelection::SavedAddress {
                address_id: id.clone(),
            },
            ShippingSelection::New(address) => CheckoutSelection::NewAddress {
                address: address.clone(),
            },
        }
    }
}
