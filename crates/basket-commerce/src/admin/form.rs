//! Admin product form: validation and the payload sent to the backend.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{self, Currency, Money};

/// Rating shown on a new product until real reviews arrive.
pub const DEFAULT_RATING: f64 = 4.5;

/// Whether the form creates a product or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ProductId),
}

/// An image file attached to a product submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> Result<Self, CommerceError> {
        let bytes = std::fs::read(path).map_err(|e| {
            CommerceError::validation(format!("cannot read image {}: {}", path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(CommerceError::validation(format!(
                "image {} is empty",
                path.display()
            )));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Product body for create and update calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    #[serde(with = "money::wire")]
    pub price: Money,
    #[serde(with = "money::wire")]
    pub original_price: Money,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub weight: String,
    pub stock_quantity: i64,
    pub in_stock: bool,
    /// Existing image reference, kept when an edit brings no new file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
}

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub weight: String,
    pub stock_quantity: String,
    /// Comma-separated.
    pub ingredients: String,
    /// Comma-separated.
    pub benefits: String,
    pub image: Option<ImageUpload>,
    existing_image_url: Option<String>,
    rating: Option<f64>,
    review_count: Option<i64>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from an existing product for editing.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display_amount(),
            original_price: product
                .original_price
                .unwrap_or(product.price)
                .display_amount(),
            category: product.category.clone().unwrap_or_default(),
            subcategory: product.subcategory.clone().unwrap_or_default(),
            brand: product.brand.clone().unwrap_or_default(),
            weight: product.weight.clone().unwrap_or_default(),
            stock_quantity: product.stock_quantity.unwrap_or(0).to_string(),
            ingredients: product.ingredients.join(", "),
            benefits: product.benefits.join(", "),
            image: None,
            existing_image_url: product.image_url.clone(),
            rating: Some(product.rating),
            review_count: Some(product.review_count),
        }
    }

    /// Required fields that are blank.
    pub fn missing_fields(&self, mode: &FormMode) -> Vec<&'static str> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("price", &self.price),
            ("original price", &self.original_price),
            ("category", &self.category),
            ("weight", &self.weight),
            ("stock quantity", &self.stock_quantity),
        ];
        let mut missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();
        if *mode == FormMode::Create && self.image.is_none() {
            missing.push("image");
        }
        missing
    }

    pub fn validate(&self, mode: &FormMode) -> Result<(), CommerceError> {
        self.build(mode).map(|_| ())
    }

    /// Validate and split into the JSON payload and the optional image.
    pub fn into_submission(
        self,
        mode: &FormMode,
    ) -> Result<(ProductPayload, Option<ImageUpload>), CommerceError> {
        let payload = self.build(mode)?;
        Ok((payload, self.image))
    }

    fn build(&self, mode: &FormMode) -> Result<ProductPayload, CommerceError> {
        let missing = self.missing_fields(mode);
        if !missing.is_empty() {
            return Err(CommerceError::validation(format!(
                "please fill in: {}",
                missing.join(", ")
            )));
        }

        let price = parse_amount("price", &self.price)?;
        let original_price = parse_amount("original price", &self.original_price)?;
        let stock_quantity: i64 = self.stock_quantity.trim().parse().map_err(|_| {
            CommerceError::validation("stock quantity must be a whole number")
        })?;
        if stock_quantity < 0 {
            return Err(CommerceError::validation("stock quantity cannot be negative"));
        }

        let image_url = match mode {
            FormMode::Edit(_) if self.image.is_none() => self.existing_image_url.clone(),
            _ => None,
        };

        Ok(ProductPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            original_price,
            category: self.category.trim().to_string(),
            subcategory: non_blank(&self.subcategory),
            brand: non_blank(&self.brand),
            weight: self.weight.trim().to_string(),
            stock_quantity,
            in_stock: stock_quantity > 0,
            image_url,
            rating: self.rating.unwrap_or(DEFAULT_RATING),
            review_count: self.review_count.unwrap_or(0),
            ingredients: split_list(&self.ingredients),
            benefits: split_list(&self.benefits),
        })
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<Money, CommerceError> {
    let value: f64 = raw
        .trim()
        .trim_start_matches('₹')
        .trim()
        .parse()
        .map_err(|_| CommerceError::validation(format!("{} must be a number", field)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(CommerceError::validation(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(Money::from_decimal(value, Currency::INR))
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize_product;
    use serde_json::json;

    fn filled() -> ProductForm {
        ProductForm {
            name: "Ragi Flour".to_string(),
            description: "Stone ground".to_string(),
            price: "90".to_string(),
            original_price: "₹110".to_string(),
            category: "flours".to_string(),
            weight: "500g".to_string(),
            stock_quantity: "12".to_string(),
            ingredients: "ragi, ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_image() {
        let form = filled();
        let err = form.validate(&FormMode::Create).unwrap_err();
        assert!(err.to_string().contains("image"));

        let mut form = filled();
        form.image = Some(ImageUpload::new("ragi.PNG", vec![1, 2, 3]));
        let (payload, image) = form.into_submission(&FormMode::Create).unwrap();
        assert_eq!(payload.price, Money::inr(90));
        assert_eq!(payload.original_price, Money::inr(110));
        assert_eq!(payload.rating, DEFAULT_RATING);
        assert_eq!(payload.review_count, 0);
        assert_eq!(payload.ingredients, vec!["ragi"]);
        assert!(payload.in_stock);
        assert_eq!(image.unwrap().content_type, "image/png");
    }

    #[test]
    fn test_missing_fields_listed() {
        let mut form = filled();
        form.weight.clear();
        form.category = "  ".to_string();
        assert_eq!(
            form.missing_fields(&FormMode::Edit(ProductId::new("1"))),
            vec!["category", "weight"]
        );
    }

    #[test]
    fn test_bad_numbers() {
        let mut form = filled();
        form.price = "abc".to_string();
        assert!(form.validate(&FormMode::Edit(ProductId::new("1"))).is_err());

        let mut form = filled();
        form.stock_quantity = "-1".to_string();
        assert!(form.validate(&FormMode::Edit(ProductId::new("1"))).is_err());

        let mut form = filled();
        form.original_price = "0".to_string();
        assert!(form.validate(&FormMode::Edit(ProductId::new("1"))).is_err());
    }

    #[test]
    fn test_edit_preserves_image_and_rating() {
        let product = normalize_product(&json!({
            "id": 4, "name": "Honey", "description": "Raw", "price": 399,
            "originalPrice": 450, "category": "sweeteners", "weight": "250g",
            "stockQuantity": 0, "imageUrl": "honey.jpg", "rating": 4.8, "reviewCount": 31
        }))
        .unwrap();
        let mode = FormMode::Edit(product.id.clone());

        let (payload, image) = ProductForm::from_product(&product)
            .into_submission(&mode)
            .unwrap();
        assert!(image.is_none());
        assert_eq!(payload.image_url.as_deref(), Some("honey.jpg"));
        assert_eq!(payload.rating, 4.8);
        assert_eq!(payload.review_count, 31);
        assert!(!payload.in_stock);

        let mut form = ProductForm::from_product(&product);
        form.image = Some(ImageUpload::new("new.jpg", vec![9]));
        let (payload, _) = form.into_submission(&mode).unwrap();
        assert_eq!(payload.image_url, None);
    }

    #[test]
    fn test_payload_wire_shape() {
        let mut form = filled();
        form.image = Some(ImageUpload::new("a.jpg", vec![1]));
        let (payload, _) = form.into_submission(&FormMode::Create).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["originalPrice"], json!(110.0));
        assert_eq!(value["stockQuantity"], json!(12));
        assert!(value.get("imageUrl").is_none());
    }

    #[test]
    fn test_image_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.webp");
        std::fs::write(&path, b"RIFF").unwrap();
        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name, "jar.webp");
        assert_eq!(upload.content_type, "image/webp");

        assert!(ImageUpload::from_path(&dir.path().join("missing.png")).is_err());
    }
}
