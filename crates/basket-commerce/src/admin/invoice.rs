//! Printable invoices for placed orders.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::admin::AdminError;
use crate::checkout::{KeyedInFlight, Order};
use crate::money::Money;

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_CUSTOMER: &str = "Valued Customer";

/// Store details printed in the invoice header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceSettings {
    pub store_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            store_name: "Neenu's Natural".to_string(),
            address: "Natural & Organic Products Hub, Bangalore, India".to_string(),
            phone: "+91 7892783668".to_string(),
            email: "info@neenusnatural.com".to_string(),
        }
    }
}

/// One invoice row.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

/// Invoice data resolved from an order, with every fallback applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub number: String,
    pub date: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: String,
    pub status: String,
}

impl Invoice {
    pub fn from_order(order: &Order) -> Self {
        let lines: Vec<InvoiceLine> = order
            .items
            .iter()
            .map(|item| InvoiceLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.price,
                amount: item.line_total(),
            })
            .collect();

        let subtotal = if order.subtotal.is_zero() {
            lines.iter().fold(Money::default(), |acc, l| acc + l.amount)
        } else {
            order.subtotal
        };
        let total = if order.total.is_zero() {
            (subtotal + order.shipping_fee - order.discount).non_negative()
        } else {
            order.total
        };

        Self {
            number: order.display_number(),
            date: order
                .created_at
                .map(|t| t.format("%d %b %Y").to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            customer_name: order.customer_name().unwrap_or(DEFAULT_CUSTOMER).to_string(),
            customer_email: order.customer_email().unwrap_or(NOT_AVAILABLE).to_string(),
            customer_phone: order.customer_phone().unwrap_or(NOT_AVAILABLE).to_string(),
            shipping_address: order
                .shipping
                .as_ref()
                .map(|a| a.one_line())
                .filter(|a| !a.is_empty()),
            lines,
            subtotal,
            shipping: order.shipping_fee,
            discount: order.discount,
            total,
            payment_method: order
                .payment_method
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: order.status.display_name().to_string(),
        }
    }

    /// Plain-text rendering.
    pub fn render(&self, settings: &InvoiceSettings) -> String {
        let rule = "-".repeat(64);
        let mut out = String::new();

        let _ = writeln!(out, "{}", settings.store_name);
        let _ = writeln!(out, "{}", settings.address);
        let _ = writeln!(out, "Phone: {} | Email: {}", settings.phone, settings.email);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "INVOICE {}", self.number);
        let _ = writeln!(out, "Date: {}", self.date);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out);
        let _ = writeln!(out, "Bill to: {}", self.customer_name);
        let _ = writeln!(out, "Email: {}", self.customer_email);
        let _ = writeln!(out, "Phone: {}", self.customer_phone);
        if let Some(address) = &self.shipping_address {
            let _ = writeln!(out, "Ship to: {}", address);
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:<32} {:>5} {:>12} {:>12}", "Item", "Qty", "Price", "Amount");
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{:<32} {:>5} {:>12} {:>12}",
                truncate(&line.name, 32),
                line.quantity,
                line.unit_price.display(),
                line.amount.display()
            );
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:>51} {:>12}", "Subtotal:", self.subtotal.display());
        let shipping = if self.shipping.is_zero() {
            "FREE".to_string()
        } else {
            self.shipping.display()
        };
        let _ = writeln!(out, "{:>51} {:>12}", "Shipping:", shipping);
        if self.discount.is_positive() {
            let _ = writeln!(
                out,
                "{:>51} {:>12}",
                "Discount:",
                format!("-{}", self.discount.display())
            );
        }
        let _ = writeln!(out, "{:>51} {:>12}", "Total:", self.total.display());
        let _ = writeln!(out, "Payment: {}", self.payment_method);
        let _ = writeln!(out);
        let _ = writeln!(out, "Thank you for shopping with {}!", settings.store_name);
        out
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Writes invoice files, at most one at a time per order.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDesk {
    settings: InvoiceSettings,
    in_flight: KeyedInFlight,
}

impl InvoiceDesk {
    pub fn new(settings: InvoiceSettings) -> Self {
        Self {
            settings,
            in_flight: KeyedInFlight::new(),
        }
    }

    pub fn settings(&self) -> &InvoiceSettings {
        &self.settings
    }

    /// Render the invoice text for `order`.
    pub fn render(&self, order: &Order) -> Result<String, AdminError> {
        let _guard = self
            .in_flight
            .try_begin(order.id.as_str())
            .ok_or_else(|| AdminError::Busy(order.id.to_string()))?;
        Ok(Invoice::from_order(order).render(&self.settings))
    }

    /// Write `invoice-<number>.txt` into `dir` and return its path.
    pub fn write(&self, order: &Order, dir: &Path) -> Result<PathBuf, AdminError> {
        let _guard = self
            .in_flight
            .try_begin(order.id.as_str())
            .ok_or_else(|| AdminError::Busy(order.id.to_string()))?;
        let invoice = Invoice::from_order(order);
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("invoice-{}.txt", invoice.number));
        std::fs::write(&path, invoice.render(&self.settings))?;
        tracing::info!(order_id = %order.id, path = %path.display(), "invoice written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: serde_json::Value) -> Order {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fallbacks() {
        let invoice = Invoice::from_order(&order(json!({
            "id": 5,
            "items": [{"name": "Ghee", "quantity": 2, "price": 280}],
            "createdAt": "2024-11-02T08:00:00Z"
        })));
        assert_eq!(invoice.number, "NN-2024-005");
        assert_eq!(invoice.date, "02 Nov 2024");
        assert_eq!(invoice.customer_name, "Valued Customer");
        assert_eq!(invoice.customer_email, "N/A");
        assert_eq!(invoice.customer_phone, "N/A");
        assert_eq!(invoice.subtotal, Money::inr(560));
        assert_eq!(invoice.total, Money::inr(560));
        assert_eq!(invoice.payment_method, "N/A");
    }

    #[test]
    fn test_user_name_when_no_shipping_name() {
        let invoice = Invoice::from_order(&order(json!({
            "id": 6,
            "user": {"name": "Ravi", "email": "ravi@example.com"}
        })));
        assert_eq!(invoice.customer_name, "Ravi");
        assert_eq!(invoice.customer_email, "ravi@example.com");
    }

    #[test]
    fn test_render_contains_store_and_totals() {
        let text = Invoice::from_order(&order(json!({
            "id": 8,
            "orderNumber": "ORD-8",
            "items": [{"name": "Honey", "quantity": 1, "price": 1600}],
            "subtotal": 1600, "discount": 160, "total": 1440,
            "paymentMethod": "upi"
        })))
        .render(&InvoiceSettings::default());
        assert!(text.starts_with("Neenu's Natural\n"));
        assert!(text.contains("INVOICE ORD-8"));
        assert!(text.contains("-₹160.00"));
        assert!(text.contains("₹1440.00"));
        assert!(text.contains("Payment: UPI"));
    }

    #[test]
    fn test_busy_order_rejected() {
        let desk = InvoiceDesk::default();
        let o = order(json!({"id": 9}));
        let _held = desk.in_flight.try_begin("9").unwrap();
        assert!(matches!(desk.render(&o), Err(AdminError::Busy(_))));
        assert!(desk.render(&order(json!({"id": 10}))).is_ok());
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let desk = InvoiceDesk::default();
        let path = desk
            .write(&order(json!({"id": 11, "orderNumber": "ORD-11"})), &dir.path().join("out"))
            .unwrap();
        assert!(path.ends_with("invoice-ORD-11.txt"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("ORD-11"));
    }
}
