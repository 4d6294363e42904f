//! Checkout endpoints. Every call is keyed by the customer's email.

use async_trait::async_trait;
use basket_commerce::backend::{BackendError, CheckoutBackend};
use basket_commerce::checkout::{CheckoutSelection, Order, OrderReview};
use reqwest::Method;

use crate::client::ApiClient;

#[async_trait]
impl CheckoutBackend for ApiClient {
    async fn save_selection(
        &self,
        email: &str,
        selection: &CheckoutSelection,
    ) -> Result<(), BackendError> {
        let url = self.endpoint_with_query(&["checkout", "selection"], "email", email)?;
        self.send_empty(self.request(Method::POST, url).json(selection))
            .await?;
        Ok(())
    }

    async fn review(&self, email: &str) -> Result<OrderReview, BackendError> {
        let url = self.endpoint_with_query(&["checkout", "review"], "email", email)?;
        Ok(self.get_json(url).await?)
    }

    async fn place_order(&self, email: &str) -> Result<Order, BackendError> {
        let url = self.endpoint_with_query(&["checkout", "place-order"], "email", email)?;
        let order: Order = self
            .send_json(self.request(Method::POST, url), "/checkout/place-order")
            .await?;
        tracing::info!(order_id = %order.id, "order created by backend");
        Ok(order)
    }
}
