//! Admin endpoints: products, orders, categories.

use async_trait::async_trait;
use basket_commerce::admin::{ImageUpload, ProductPayload};
use basket_commerce::backend::{AdminBackend, BackendError};
use basket_commerce::catalog::{Category, CategoryPayload, Product};
use basket_commerce::checkout::{Order, OrderStatus};
use basket_commerce::ids::{CategoryId, OrderId, ProductId};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::json;
use url::Url;

use crate::client::{list_items, ApiClient};
use crate::error::FetchError;

impl ApiClient {
    /// JSON body, or a multipart form with `product` (JSON) and `image` parts.
    fn product_request(
        &self,
        method: Method,
        url: Url,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<RequestBuilder, FetchError> {
        let builder = self.request(method, url);
        let Some(image) = image else {
            return Ok(builder.json(product));
        };

        let product_json = serde_json::to_string(product)
            .map_err(|e| FetchError::Request(format!("encode product: {}", e)))?;
        let product_part = Part::text(product_json)
            .mime_str("application/json")
            .map_err(FetchError::from)?;
        let image_part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(FetchError::from)?;
        tracing::debug!(file = %image.file_name, bytes = image.bytes.len(), "multipart product upload");
        Ok(builder.multipart(
            Form::new()
                .part("product", product_part)
                .part("image", image_part),
        ))
    }

    async fn save_product(
        &self,
        method: Method,
        url: Url,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<Product, FetchError> {
        let context = url.path().to_string();
        let builder = self.product_request(method, url, product, image)?;
        let raw = self.send_value(builder, &context).await?;
        Self::decode_product(&raw, &context)
    }
}

#[async_trait]
impl AdminBackend for ApiClient {
    async fn admin_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.fetch_products(&["admin", "products"]).await?)
    }

    async fn create_product(
        &self,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<Product, BackendError> {
        let url = self.endpoint(&["admin", "products"])?;
        let created = self.save_product(Method::POST, url, product, image).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "product created");
        Ok(created)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        product: &ProductPayload,
        image: Option<&ImageUpload>,
    ) -> Result<Product, BackendError> {
        let url = self.endpoint(&["admin", "products", id.as_str()])?;
        let updated = self.save_product(Method::PUT, url, product, image).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(updated)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        let url = self.endpoint(&["admin", "products", id.as_str()])?;
        self.send_empty(self.request(Method::DELETE, url)).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
        let raw = self.get_value(self.endpoint(&["admin", "orders"])?).await?;
        let orders = list_items(raw)
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Order>(item) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed order");
                    None
                }
            })
            .collect();
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: &OrderStatus,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["admin", "orders", id.as_str(), "status"])?;
        self.send_empty(
            self.request(Method::PATCH, url)
                .json(&json!({ "status": status.as_str() })),
        )
        .await?;
        tracing::info!(order_id = %id, status = %status, "order status updated");
        Ok(())
    }

    async fn create_category(&self, category: &CategoryPayload) -> Result<Category, BackendError> {
        let url = self.endpoint(&["admin", "categories"])?;
        Ok(self.write_json(Method::POST, url, category).await?)
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        category: &CategoryPayload,
    ) -> Result<Category, BackendError> {
        let url = self.endpoint(&["admin", "categories", id.as_str()])?;
        Ok(self.write_json(Method::PUT, url, category).await?)
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), BackendError> {
        let url = self.endpoint(&["admin", "categories", id.as_str()])?;
        self.send_empty(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
