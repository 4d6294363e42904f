//! Address types.

use crate::error::CommerceError;
use crate::ids::AddressId;
use crate::wire;
use serde::{Deserialize, Serialize};

/// A delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Saved-address id (None for addresses typed in at checkout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    /// Recipient name.
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub phone: String,
    /// House, street and area.
    #[serde(default, alias = "address", alias = "streetAddress")]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default, alias = "zip", alias = "zipCode", deserialize_with = "de_text")]
    pub pincode: String,
}

fn de_text<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(wire::de_opt_text(deserializer)?.unwrap_or_default())
}

impl ShippingAddress {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect()
    }

    /// Check if address is complete.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Validate before anything is sent to the backend.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::validation(format!(
                "address is missing {}",
                missing.join(", ")
            )));
        }
        if !self.pincode.trim().chars().all(|c| c.is_ascii_digit()) {
            return Err(CommerceError::validation("pincode must be numeric"));
        }
        Ok(())
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.clone()];
        if let Some(ref landmark) = self.landmark {
            parts.push(landmark.clone());
        }
        parts.push(self.city.clone());
        parts.push(format!("{} - {}", self.state, self.pincode));
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format as multi-line, recipient first.
    pub fn multi_line(&self) -> String {
        let mut lines = vec![self.name.clone(), self.street.clone()];
        if let Some(ref landmark) = self.landmark {
            lines.push(landmark.clone());
        }
        lines.push(format!("{}, {} {}", self.city, self.state, self.pincode));
        if !self.phone.is_empty() {
            lines.push(format!("Phone: {}", self.phone));
        }
        lines.join("\n")
    }
}
