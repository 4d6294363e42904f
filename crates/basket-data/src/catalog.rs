//! Public catalog reads.

use async_trait::async_trait;
use basket_commerce::backend::{BackendError, CatalogBackend};
use basket_commerce::catalog::{
    active_only, normalize_product, normalize_products, Category, Product,
};
use basket_commerce::ids::{CategoryId, ProductId};
use serde_json::Value;

use crate::client::{list_items, ApiClient};
use crate::error::FetchError;

impl ApiClient {
    pub(crate) async fn fetch_products(&self, segments: &[&str]) -> Result<Vec<Product>, FetchError> {
        let raw = self.get_value(self.endpoint(segments)?).await?;
        let products = normalize_products(&raw);
        tracing::debug!(count = products.len(), "products loaded");
        Ok(products)
    }

    pub(crate) fn decode_product(raw: &Value, context: &str) -> Result<Product, FetchError> {
        normalize_product(raw).ok_or_else(|| FetchError::parse(context, "product record has no id"))
    }

    pub(crate) fn decode_categories(raw: Value) -> Vec<Category> {
        list_items(raw)
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Category>(item) {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed category");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl CatalogBackend for ApiClient {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(active_only(self.fetch_products(&["public", "products"]).await?))
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let url = self.endpoint(&["public", "products", id.as_str()])?;
        let context = url.path().to_string();
        let raw = self.get_value(url).await?;
        Ok(Self::decode_product(&raw, &context)?)
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let products = self
            .fetch_products(&["public", "products", "category", category])
            .await?;
        Ok(active_only(products))
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint_with_query(&["public", "products", "search"], "q", query.trim())?;
        let raw = self.get_value(url).await?;
        Ok(active_only(normalize_products(&raw)))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let raw = self.get_value(self.endpoint(&["categories"])?).await?;
        Ok(Self::decode_categories(raw))
    }

    async fn get_category(&self, id: &CategoryId) -> Result<Category, BackendError> {
        let url = self.endpoint(&["categories", id.as_str()])?;
        Ok(self.get_json(url).await?)
    }
}
