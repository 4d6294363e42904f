//! Turn loosely shaped backend product records into [`Product`].
//!
//! Older endpoints and seed data use different field names for the same
//! thing. All of that is resolved here, once, when a record enters the
//! client.

use crate::catalog::{Product, ProductVariant};
use crate::ids::ProductId;
use crate::money::{wire as money_wire, Money};
use crate::wire;
use serde_json::Value;

const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Normalize one raw product record.
///
/// Returns `None` for records that are not objects or carry no usable id.
pub fn normalize_product(raw: &Value) -> Option<Product> {
    let obj = raw.as_object()?;
    let field = |names: &[&str]| -> Option<&Value> {
        names
            .iter()
            .filter_map(|n| obj.get(*n))
            .find(|v| !v.is_null())
    };
    let text = |names: &[&str]| names.iter().filter_map(|n| obj.get(*n)).find_map(wire::text);
    let money = |names: &[&str]| {
        names
            .iter()
            .filter_map(|n| obj.get(*n))
            .find_map(money_wire::from_value)
    };

    let id = text(&["id", "productId", "_id"])?;

    let category = field(&["category"])
        .and_then(|c| match c {
            Value::Object(inner) => inner.get("name").and_then(wire::text),
            other => wire::text(other),
        })
        .or_else(|| text(&["categoryId", "subcategory"]));

    let variants = field(&["variants"])
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(normalize_variant).collect())
        .unwrap_or_default();

    Some(Product {
        id: ProductId::new(id),
        name: text(&["name", "title"]).unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
        description: text(&["description"]).unwrap_or_default(),
        price: money(&["price", "salePrice", "mrp"]).unwrap_or_default(),
        sale_price: money(&["salePrice"]),
        original_price: money(&["originalPrice", "mrp"]),
        category,
        subcategory: text(&["subcategory"]),
        brand: text(&["brand", "manufacturer"]),
        weight: text(&["weight"]),
        stock_quantity: field(&["stockQuantity", "quantity", "stock"]).and_then(wire::int),
        in_stock: field(&["inStock"]).and_then(wire::boolean).unwrap_or(true),
        is_active: field(&["isActive", "active"]).and_then(wire::boolean).unwrap_or(true),
        image_url: text(&["imageUrl", "image", "image_path", "thumbnailUrl"]),
        rating: field(&["rating", "ratingValue"])
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .filter(|r: &f64| r.is_finite())
            .unwrap_or(0.0),
        review_count: field(&["reviewCount", "reviews"]).and_then(wire::int).unwrap_or(0),
        ingredients: string_list(field(&["ingredients"])),
        benefits: string_list(field(&["benefits"])),
        variants,
    })
}

/// Normalize a list response, dropping records without an id.
pub fn normalize_products(raw: &Value) -> Vec<Product> {
    match raw {
        Value::Array(items) => items.iter().filter_map(normalize_product).collect(),
        Value::Object(obj) => obj
            .get("content")
            .or_else(|| obj.get("data"))
            .map(normalize_products)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// A JSON array of strings, or a comma-separated string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(wire::text).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_variant(raw: &Value) -> Option<ProductVariant> {
    let obj = raw.as_object()?;
    let label = ["weight", "label", "size"]
        .iter()
        .filter_map(|n| obj.get(*n))
        .find_map(wire::text)?;
    let money = |name: &str| obj.get(name).and_then(money_wire::from_value);

    Some(ProductVariant {
        label,
        price: money("price").unwrap_or(Money::default()),
        sale_price: money("salePrice"),
        original_price: money("originalPrice"),
        stock: obj.get("stock").and_then(wire::int),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_record() {
        let p = normalize_product(&json!({
            "id": 12,
            "name": "Cold Pressed Groundnut Oil",
            "description": "Wood pressed",
            "price": 320.0,
            "originalPrice": 380.0,
            "category": "oils",
            "weight": "1L",
            "stockQuantity": 25,
            "imageUrl": "oil.jpg",
            "rating": 4.5,
            "reviewCount": 3,
            "inStock": true,
            "ingredients": "Groundnut, ",
            "benefits": ["Heart healthy"]
        }))
        .unwrap();

        assert_eq!(p.id.as_str(), "12");
        assert_eq!(p.price, Money::inr(320));
        assert_eq!(p.original_price, Some(Money::inr(380)));
        assert_eq!(p.stock_quantity, Some(25));
        assert_eq!(p.image_url.as_deref(), Some("oil.jpg"));
        assert_eq!(p.ingredients, vec!["Groundnut"]);
        assert_eq!(p.benefits, vec!["Heart healthy"]);
    }

    #[test]
    fn test_fallback_field_names() {
        let p = normalize_product(&json!({
            "_id": "abc",
            "title": "Jaggery Powder",
            "mrp": "150",
            "manufacturer": "Farm Co",
            "quantity": "4",
            "image_path": "C:\\uploads\\jaggery.png",
            "category": {"id": 2, "name": "sweeteners"}
        }))
        .unwrap();

        assert_eq!(p.name, "Jaggery Powder");
        assert_eq!(p.price, Money::inr(150));
        assert_eq!(p.original_price, Some(Money::inr(150)));
        assert_eq!(p.brand.as_deref(), Some("Farm Co"));
        assert_eq!(p.stock_quantity, Some(4));
        assert_eq!(p.category.as_deref(), Some("sweeteners"));
        assert!(p.in_stock);
    }

    #[test]
    fn test_garbage_numbers_become_defaults() {
        let p = normalize_product(&json!({
            "id": 1,
            "price": "free!",
            "rating": "great",
            "stockQuantity": null
        }))
        .unwrap();

        assert!(p.price.is_zero());
        assert_eq!(p.rating, 0.0);
        assert_eq!(p.stock_quantity, None);
        assert_eq!(p.name, UNNAMED_PRODUCT);
    }

    #[test]
    fn test_variants() {
        let p = normalize_product(&json!({
            "id": 5,
            "name": "Ragi Flour",
            "price": 90,
            "variants": [
                {"weight": "500g", "price": 90, "stock": 2},
                {"weight": "1kg", "price": "170", "salePrice": 160},
                {"price": 10}
            ]
        }))
        .unwrap();

        assert_eq!(p.variants.len(), 2);
        assert_eq!(p.variants[1].sale_price, Some(Money::inr(160)));
        assert_eq!(p.variants[0].stock, Some(2));
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        let list = normalize_products(&json!([
            {"id": 1, "name": "a"},
            {"name": "no id"},
            "not an object"
        ]));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_paged_envelope() {
        let list = normalize_products(&json!({"content": [{"id": 1}, {"id": 2}]}));
        assert_eq!(list.len(), 2);
    }
}
