//! Category types for product organization.

use crate::ids::CategoryId;
use crate::wire;
use serde::{Deserialize, Serialize};

/// A product category. The store keeps a flat list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub image_url: Option<String>,
}

/// Body for creating or renaming a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CategoryPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject blank names before they reach the backend.
    pub fn validate(&self) -> Result<(), crate::CommerceError> {
        if self.name.trim().is_empty() {
            return Err(crate::CommerceError::validation("Category name is required"));
        }
        Ok(())
    }
}
