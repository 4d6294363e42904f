//! Client-side list filters for the admin console.

use crate::catalog::{Category, Product};
use crate::checkout::{Order, OrderStatus};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    (!q.is_empty()).then_some(q)
}

/// Product list filter: text over name and description, exact category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: String,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        match normalized(&self.query) {
            Some(q) => contains_ci(&product.name, &q) || contains_ci(&product.description, &q),
            None => true,
        }
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Order list filter: id substring or customer name/email, exact status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub query: String,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = &self.status {
            if &order.status != status {
                return false;
            }
        }
        let Some(q) = normalized(&self.query) else {
            return true;
        };
        if contains_ci(order.id.as_str(), &q) {
            return true;
        }
        let shipping_name = order.shipping.as_ref().map(|s| s.name.as_str());
        let email = order.user.as_ref().and_then(|u| u.email.as_deref());
        shipping_name.is_some_and(|n| contains_ci(n, &q)) || email.is_some_and(|e| contains_ci(e, &q))
    }

    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

/// Category list filter: text over name and description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub query: String,
}

impl CategoryFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn matches(&self, category: &Category) -> bool {
        match normalized(&self.query) {
            Some(q) => {
                contains_ci(&category.name, &q)
                    || category
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, &q))
            }
            None => true,
        }
    }

    pub fn apply<'a>(&self, categories: &'a [Category]) -> Vec<&'a Category> {
        categories.iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize_product;
    use serde_json::json;

    fn products() -> Vec<Product> {
        [
            json!({"id": 1, "name": "A2 Cow Ghee", "description": "Bilona", "category": "ghee", "price": 999}),
            json!({"id": 2, "name": "Groundnut Oil", "description": "Cold pressed", "category": "oils", "price": 320}),
            json!({"id": 3, "name": "Sesame Oil", "description": "Made with GHEE-free process", "category": "oils", "price": 300}),
        ]
        .iter()
        .filter_map(normalize_product)
        .collect()
    }

    fn orders() -> Vec<Order> {
        serde_json::from_value(json!([
            {"id": 101, "status": "pending", "user": {"email": "Asha@Example.com"},
             "shipping": {"name": "Asha Rao"}},
            {"id": 102, "status": "shipped", "user": {"email": "ravi@example.com"},
             "shipping": {"name": "Ravi Kumar"}},
            {"id": 210, "status": "PENDING"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_product_text_is_case_insensitive() {
        let list = products();
        let hits = ProductFilter::text("ghee").apply(&list);
        assert_eq!(hits.len(), 2);
        assert!(ProductFilter::text("  ").apply(&list).len() == 3);
    }

    #[test]
    fn test_product_category_is_exact() {
        let list = products();
        let hits = ProductFilter::text("ghee").with_category("oils").apply(&list);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "3");
        assert!(ProductFilter::default().with_category("Oils").apply(&list).is_empty());
    }

    #[test]
    fn test_order_search() {
        let list = orders();
        assert_eq!(OrderFilter::text("10").apply(&list).len(), 3);
        assert_eq!(OrderFilter::text("21").apply(&list).len(), 1);
        assert_eq!(OrderFilter::text("asha@example").apply(&list).len(), 1);
        assert_eq!(OrderFilter::text("KUMAR").apply(&list)[0].id.as_str(), "102");
        assert_eq!(
            OrderFilter::default()
                .with_status(OrderStatus::Pending)
                .apply(&list)
                .len(),
            2
        );
    }

    #[test]
    fn test_category_filter() {
        let list: Vec<Category> = serde_json::from_value(json!([
            {"id": 1, "name": "Millets"},
            {"id": 2, "name": "Oils", "description": "cold pressed millet-free"}
        ]))
        .unwrap();
        assert_eq!(CategoryFilter::text("MILLET").apply(&list).len(), 2);
    }
}
