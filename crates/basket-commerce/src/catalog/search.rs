//! Storefront search helpers.

use crate::catalog::Product;

/// Queries shorter than this produce no suggestions.
pub const MIN_SUGGESTION_QUERY: usize = 2;

/// Maximum suggestions shown under the search box.
pub const MAX_SUGGESTIONS: usize = 8;

/// Header search-as-you-type: products whose name contains the query.
pub fn suggestions<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&query))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Products visible on the storefront.
pub fn active_only(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(|p| p.is_active).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize_product;
    use serde_json::json;

    fn catalog(names: &[&str]) -> Vec<Product> {
        names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| normalize_product(&json!({"id": i, "name": n, "price": 10})))
            .collect()
    }

    #[test]
    fn test_short_query_yields_nothing() {
        let products = catalog(&["Ghee", "Honey"]);
        assert!(suggestions(&products, "g").is_empty());
        assert!(suggestions(&products, "  ").is_empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let products = catalog(&["A2 Ghee", "Honey", "Ghee Rice Mix"]);
        let names: Vec<_> = suggestions(&products, "GHEE").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A2 Ghee", "Ghee Rice Mix"]);
    }

    #[test]
    fn test_capped_at_eight() {
        let names: Vec<String> = (0..20).map(|i| format!("Millet {}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let products = catalog(&refs);
        assert_eq!(suggestions(&products, "millet").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_active_only() {
        let mut products = catalog(&["a", "b"]);
        products[0].is_active = false;
        assert_eq!(active_only(products).len(), 1);
    }
}
