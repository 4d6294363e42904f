//! Order notifications.
//!
//! Sending is best-effort: the sequencer logs a failed send and carries on,
//! so channels only report what went wrong.

mod whatsapp;

pub use whatsapp::{LinkSink, LogSink, WhatsAppChannel, DEFAULT_RECIPIENT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::{Customer, Order, OrderItem, OrderReview, ShippingAddress};
use crate::money::Money;

/// A failed notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("Could not build notification: {0}")]
    Build(String),
}

/// Where the shopper was when ordering, if they shared it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn maps_link(&self) -> String {
        format!(
            "https://www.google.com/maps?q={:.6},{:.6}",
            self.latitude, self.longitude
        )
    }
}

/// Everything a notification message is built from.
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order: Order,
    /// Review captured at step 3; may be absent.
    pub review: Option<OrderReview>,
    pub customer: Customer,
    pub location: Option<GeoLocation>,
}

impl OrderNotification {
    /// Plain-text message in WhatsApp markup.
    pub fn render(&self) -> String {
        let order = &self.order;
        let review = self.review.as_ref();
        let mut out = Vec::new();

        out.push(format!("*New Order {}*", order.display_number()));
        out.push(String::new());
        out.push(format!(
            "*Customer:* {}",
            order.customer_name().unwrap_or(self.customer.name.as_str())
        ));
        out.push(format!(
            "*Email:* {}",
            order.customer_email().unwrap_or(self.customer.email.as_str())
        ));
        if let Some(phone) = order.customer_phone().or(self.customer.phone.as_deref()) {
            out.push(format!("*Phone:* {}", phone));
        }

        let items: &[OrderItem] = match review {
            Some(r) if !r.items.is_empty() => &r.items,
            _ => &order.items,
        };
        if !items.is_empty() {
            out.push(String::new());
            out.push("*Items:*".to_string());
            for (i, item) in items.iter().enumerate() {
                out.push(format!(
                    "{}. {} x{} - {}",
                    i + 1,
                    item.name,
                    item.quantity,
                    item.line_total().display()
                ));
            }
        }

        let pick = |from_order: Money, from_review: Option<Money>| {
            if from_order.is_zero() {
                from_review.unwrap_or(from_order)
            } else {
                from_order
            }
        };
        let subtotal = pick(order.subtotal, review.map(|r| r.subtotal));
        let shipping = pick(order.shipping_fee, review.map(|r| r.shipping_fee));
        let discount = pick(order.discount, review.map(|r| r.discount));
        let total = pick(order.total, review.map(|r| r.total));

        out.push(String::new());
        out.push(format!("*Subtotal:* {}", subtotal.display()));
        if shipping.is_zero() {
            out.push("*Shipping:* FREE".to_string());
        } else {
            out.push(format!("*Shipping:* {}", shipping.display()));
        }
        if discount.is_positive() {
            out.push(format!("*Discount:* -{}", discount.display()));
        }
        out.push(format!("*Total:* {}", total.display()));

        let delivery = order
            .delivery_option
            .as_deref()
            .or(review.and_then(|r| r.delivery_option.as_deref()));
        let payment = order
            .payment_method
            .as_deref()
            .or(review.and_then(|r| r.payment_method.as_deref()));
        if delivery.is_some() || payment.is_some() {
            out.push(String::new());
        }
        if let Some(delivery) = delivery {
            out.push(format!("*Delivery:* {}", delivery));
        }
        if let Some(payment) = payment {
            out.push(format!("*Payment:* {}", payment.to_uppercase()));
        }

        let address: Option<&ShippingAddress> = order
            .shipping
            .as_ref()
            .or(review.and_then(|r| r.address.as_ref()));
        if let Some(address) = address {
            out.push(String::new());
            out.push("*Shipping Address:*".to_string());
            out.push(address.multi_line());
        }

        if let Some(location) = &self.location {
            out.push(String::new());
            out.push(format!("*Location:* {}", location.maps_link()));
        }

        out.join("\n")
    }
}

/// Something that can deliver an order notification.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError>;
}

/// Channel that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledChannel;

#[async_trait]
impl NotificationChannel for DisabledChannel {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn send(&self, _notification: &OrderNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(review: Option<OrderReview>) -> OrderNotification {
        let order: Order = serde_json::from_value(json!({
            "id": 12,
            "items": [{"name": "A2 Ghee", "quantity": 2, "price": 280}],
            "subtotal": 560, "shippingFee": 0, "total": 560,
            "paymentMethod": "cod",
            "createdAt": "2025-06-01T09:00:00Z"
        }))
        .unwrap();
        OrderNotification {
            order,
            review,
            customer: Customer {
                email: "asha@example.com".to_string(),
                name: "Asha".to_string(),
                phone: None,
            },
            location: Some(GeoLocation {
                latitude: 12.9716,
                longitude: 77.5946,
            }),
        }
    }

    #[test]
    fn test_render_from_order_alone() {
        let text = notification(None).render();
        assert!(text.starts_with("*New Order NN-2025-012*"));
        assert!(text.contains("*Customer:* Asha"));
        assert!(text.contains("1. A2 Ghee x2 - ₹560.00"));
        assert!(text.contains("*Shipping:* FREE"));
        assert!(text.contains("*Payment:* COD"));
        assert!(text.contains("https://www.google.com/maps?q=12.971600,77.594600"));
        assert!(!text.contains("Discount"));
    }

    #[test]
    fn test_review_fills_gaps() {
        let review = OrderReview {
            delivery_option: Some("express".to_string()),
            discount: Money::inr(56),
            ..Default::default()
        };
        let text = notification(Some(review)).render();
        assert!(text.contains("*Delivery:* express"));
        assert!(text.contains("*Discount:* -₹56.00"));
    }
}
