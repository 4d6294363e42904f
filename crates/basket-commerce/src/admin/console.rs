//! Admin list views over the backend.
//!
//! Every mutation is followed by a full reload; nothing is patched into
//! the local list optimistically. A reload that fails after the backend
//! accepted the mutation is logged and the previous list is kept.

use std::sync::Arc;

use crate::admin::{AdminError, CategoryFilter, FormMode, OrderFilter, ProductFilter, ProductForm};
use crate::backend::AdminBackend;
use crate::catalog::{Category, CategoryPayload, Product};
use crate::checkout::{Order, OrderStatus};
use crate::ids::{CategoryId, OrderId, ProductId};

/// Product management.
pub struct ProductConsole {
    backend: Arc<dyn AdminBackend>,
    products: Vec<Product>,
    pub filter: ProductFilter,
}

impl ProductConsole {
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            backend,
            products: Vec::new(),
            filter: ProductFilter::default(),
        }
    }

    pub async fn reload(&mut self) -> Result<&[Product], AdminError> {
        self.products = self.backend.admin_products().await?;
        tracing::debug!(count = self.products.len(), "products reloaded");
        Ok(&self.products)
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "product list reload failed");
        }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Products passing the current filter.
    pub fn visible(&self) -> Vec<&Product> {
        self.filter.apply(&self.products)
    }

    /// Distinct categories in the loaded list, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .products
            .iter()
            .filter_map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Validate the form, then create or update and reload.
    pub async fn save(&mut self, mode: FormMode, form: ProductForm) -> Result<Product, AdminError> {
        let (payload, image) = form.into_submission(&mode)?;
        let saved = match &mode {
            FormMode::Create => {
                self.backend
                    .create_product(&payload, image.as_ref())
                    .await?
            }
            FormMode::Edit(id) => {
                self.backend
                    .update_product(id, &payload, image.as_ref())
                    .await?
            }
        };
        tracing::info!(
            product_id = %saved.id,
            created = matches!(mode, FormMode::Create),
            with_image = image.is_some(),
            "product saved"
        );
        self.refresh().await;
        Ok(saved)
    }

    pub async fn delete(&mut self, id: &ProductId) -> Result<(), AdminError> {
        self.backend.delete_product(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        self.refresh().await;
        Ok(())
    }
}

/// Order management.
pub struct OrderConsole {
    backend: Arc<dyn AdminBackend>,
    orders: Vec<Order>,
    pub filter: OrderFilter,
}

impl OrderConsole {
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            backend,
            orders: Vec::new(),
            filter: OrderFilter::default(),
        }
    }

    pub async fn reload(&mut self) -> Result<&[Order], AdminError> {
        self.orders = self.backend.list_orders().await?;
        tracing::debug!(count = self.orders.len(), "orders reloaded");
        Ok(&self.orders)
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "order list reload failed");
        }
    }

    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn visible(&self) -> Vec<&Order> {
        self.filter.apply(&self.orders)
    }

    pub fn find(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// Number of loaded orders in each status, in [`OrderStatus::ALL`] order.
    pub fn status_counts(&self) -> Vec<(OrderStatus, usize)> {
        OrderStatus::ALL
            .iter()
            .map(|status| {
                let n = self.orders.iter().filter(|o| &o.status == status).count();
                (status.clone(), n)
            })
            .collect()
    }

    /// Change an order's status, then reload.
    pub async fn update_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), AdminError> {
        self.backend.update_order_status(id, &status).await?;
        tracing::info!(order_id = %id, status = status.as_str(), "order status updated");
        self.refresh().await;
        Ok(())
    }
}

/// Category management.
pub struct CategoryConsole {
    backend: Arc<dyn AdminBackend>,
    categories: Vec<Category>,
    pub filter: CategoryFilter,
}

impl CategoryConsole {
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            backend,
            categories: Vec::new(),
            filter: CategoryFilter::default(),
        }
    }

    pub async fn reload(&mut self) -> Result<&[Category], AdminError> {
        self.categories = self.backend.list_categories().await?;
        Ok(&self.categories)
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "category list reload failed");
        }
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn visible(&self) -> Vec<&Category> {
        self.filter.apply(&self.categories)
    }

    pub async fn create(&mut self, payload: CategoryPayload) -> Result<Category, AdminError> {
        payload.validate()?;
        let created = self.backend.create_category(&payload).await?;
        tracing::info!(category_id = %created.id, name = %created.name, "category created");
        self.refresh().await;
        Ok(created)
    }

    pub async fn update(
        &mut self,
        id: &CategoryId,
        payload: CategoryPayload,
    ) -> Result<Category, AdminError> {
        payload.validate()?;
        let updated = self.backend.update_category(id, &payload).await?;
        tracing::info!(category_id = %id, "category updated");
        self.refresh().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &CategoryId) -> Result<(), AdminError> {
        self.backend.delete_category(id).await?;
        tracing::info!(category_id = %id, "category deleted");
        self.refresh().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{ImageUpload, ProductPayload};
    use crate::backend::{BackendError, CatalogBackend};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory backend that logs every call.
    #[derive(Default)]
    struct FakeAdmin {
        products: Mutex<Vec<Product>>,
        orders: Mutex<Vec<Order>>,
        categories: Mutex<Vec<Category>>,
        log: Mutex<Vec<String>>,
        lists_down: AtomicBool,
    }

    impl FakeAdmin {
        fn log(&self, entry: impl Into<String>) {
            self.log.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn list_result<T: Clone>(&self, items: &Mutex<Vec<T>>) -> Result<Vec<T>, BackendError> {
            if self.lists_down.load(Ordering::SeqCst) {
                return Err(BackendError::status(503, "lists unavailable"));
            }
            Ok(items.lock().unwrap().clone())
        }

        fn product(id: &str, payload: &ProductPayload) -> Product {
            serde_json::from_value(json!({
                "id": id,
                "name": payload.name,
                "price": payload.price.to_decimal(),
                "category": payload.category,
                "imageUrl": payload.image_url,
            }))
            .unwrap()
        }
    }

    #[async_trait]
    impl CatalogBackend for FakeAdmin {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            Ok(self.products.lock().unwrap().clone())
        }

        async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
            self.products
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| BackendError::status(404, "not found"))
        }

        async fn products_by_category(&self, _c: &str) -> Result<Vec<Product>, BackendError> {
            Ok(Vec::new())
        }

        async fn search_products(&self, _q: &str) -> Result<Vec<Product>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
            self.log("GET categories");
            self.list_result(&self.categories)
        }

        async fn get_category(&self, _id: &CategoryId) -> Result<Category, BackendError> {
            Err(BackendError::status(404, "not found"))
        }
    }

    #[async_trait]
    impl AdminBackend for FakeAdmin {
        async fn admin_products(&self) -> Result<Vec<Product>, BackendError> {
            self.log("GET products");
            self.list_result(&self.products)
        }

        async fn create_product(
            &self,
            product: &ProductPayload,
            image: Option<&ImageUpload>,
        ) -> Result<Product, BackendError> {
            self.log(format!("POST product image={}", image.is_some()));
            let mut products = self.products.lock().unwrap();
            let created = Self::product(&(products.len() + 1).to_string(), product);
            products.push(created.clone());
            Ok(created)
        }

        async fn update_product(
            &self,
            id: &ProductId,
            product: &ProductPayload,
            image: Option<&ImageUpload>,
        ) -> Result<Product, BackendError> {
            self.log(format!("PUT product {} image={}", id, image.is_some()));
            let updated = Self::product(id.as_str(), product);
            let mut products = self.products.lock().unwrap();
            for p in products.iter_mut().filter(|p| &p.id == id) {
                *p = updated.clone();
            }
            Ok(updated)
        }

        async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
            self.log(format!("DELETE product {}", id));
            self.products.lock().unwrap().retain(|p| &p.id != id);
            Ok(())
        }

        async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
            self.log("GET orders");
            self.list_result(&self.orders)
        }

        async fn update_order_status(
            &self,
            id: &OrderId,
            status: &OrderStatus,
        ) -> Result<(), BackendError> {
            self.log(format!("PATCH order {} {}", id, status.as_str()));
            if id.as_str() == "404" {
                return Err(BackendError::status(404, "no such order"));
            }
            for o in self.orders.lock().unwrap().iter_mut().filter(|o| &o.id == id) {
                o.status = status.clone();
            }
            Ok(())
        }

        async fn create_category(&self, category: &CategoryPayload) -> Result<Category, BackendError> {
            self.log("POST category");
            let mut categories = self.categories.lock().unwrap();
            let created = Category {
                id: CategoryId::from((categories.len() + 1) as i64),
                name: category.name.clone(),
                description: category.description.clone(),
                image_url: None,
            };
            categories.push(created.clone());
            Ok(created)
        }

        async fn update_category(
            &self,
            id: &CategoryId,
            category: &CategoryPayload,
        ) -> Result<Category, BackendError> {
            self.log(format!("PUT category {}", id));
            Ok(Category {
                id: id.clone(),
                name: category.name.clone(),
                description: None,
                image_url: None,
            })
        }

        async fn delete_category(&self, id: &CategoryId) -> Result<(), BackendError> {
            self.log(format!("DELETE category {}", id));
            self.categories.lock().unwrap().retain(|c| &c.id != id);
            Ok(())
        }
    }

    fn form() -> ProductForm {
        let mut form = ProductForm::new();
        form.name = "Kodo Millet".to_string();
        form.description = "Unpolished".to_string();
        form.price = "120".to_string();
        form.original_price = "140".to_string();
        form.category = "millets".to_string();
        form.weight = "1kg".to_string();
        form.stock_quantity = "8".to_string();
        form
    }

    #[tokio::test]
    async fn test_create_then_reload() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = ProductConsole::new(backend.clone());

        let mut f = form();
        f.image = Some(ImageUpload::new("kodo.jpg", vec![1]));
        console.save(FormMode::Create, f).await.unwrap();

        assert_eq!(console.all().len(), 1);
        assert_eq!(backend.entries(), vec!["POST product image=true", "GET products"]);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = ProductConsole::new(backend.clone());

        let err = console.save(FormMode::Create, form()).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert!(backend.entries().is_empty());
    }

    #[tokio::test]
    async fn test_edit_without_image_is_json() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = ProductConsole::new(backend.clone());
        let mut f = form();
        f.image = Some(ImageUpload::new("kodo.jpg", vec![1]));
        let created = console.save(FormMode::Create, f).await.unwrap();

        let mut edit = ProductForm::from_product(&created);
        edit.name = "Kodo Millet (Organic)".to_string();
        edit.description = "Unpolished".to_string();
        edit.original_price = "140".to_string();
        edit.weight = "1kg".to_string();
        console
            .save(FormMode::Edit(created.id.clone()), edit)
            .await
            .unwrap();

        assert_eq!(backend.entries()[2], "PUT product 1 image=false");
        assert_eq!(console.all()[0].name, "Kodo Millet (Organic)");
    }

    #[tokio::test]
    async fn test_delete_reloads() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = ProductConsole::new(backend.clone());
        let mut f = form();
        f.image = Some(ImageUpload::new("kodo.jpg", vec![1]));
        let created = console.save(FormMode::Create, f).await.unwrap();

        console.delete(&created.id).await.unwrap();
        assert!(console.all().is_empty());
        assert_eq!(backend.entries().last().unwrap(), "GET products");
    }

    #[tokio::test]
    async fn test_status_update_patches_then_reloads() {
        let backend = Arc::new(FakeAdmin::default());
        *backend.orders.lock().unwrap() =
            serde_json::from_value(json!([{"id": 7, "status": "pending"}])).unwrap();
        let mut console = OrderConsole::new(backend.clone());
        console.reload().await.unwrap();

        console
            .update_status(&OrderId::new("7"), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(console.all()[0].status, OrderStatus::Shipped);
        assert_eq!(
            backend.entries(),
            vec!["GET orders", "PATCH order 7 shipped", "GET orders"]
        );
        let counts = console.status_counts();
        assert!(counts.contains(&(OrderStatus::Shipped, 1)));
    }

    #[tokio::test]
    async fn test_failed_status_update_skips_reload() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = OrderConsole::new(backend.clone());
        let err = console
            .update_status(&OrderId::new("404"), OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Backend(_)));
        assert_eq!(backend.entries(), vec!["PATCH order 404 cancelled"]);
    }

    #[tokio::test]
    async fn test_category_crud() {
        let backend = Arc::new(FakeAdmin::default());
        let mut console = CategoryConsole::new(backend.clone());

        assert!(console.create(CategoryPayload::new(" ")).await.is_err());
        let created = console.create(CategoryPayload::new("Millets")).await.unwrap();
        assert_eq!(console.all().len(), 1);

        console.delete(&created.id).await.unwrap();
        assert!(console.all().is_empty());
        assert_eq!(
            backend.entries(),
            vec!["POST category", "GET categories", "DELETE category 1", "GET categories"]
        );
    }

    #[tokio::test]
    async fn test_reload_failure_after_accepted_mutation_still_succeeds() {
        let backend = Arc::new(FakeAdmin::default());
        *backend.orders.lock().unwrap() =
            serde_json::from_value(json!([{"id": 7, "status": "pending"}])).unwrap();
        let mut orders = OrderConsole::new(backend.clone());
        orders.reload().await.unwrap();
        let mut products = ProductConsole::new(backend.clone());
        let mut categories = CategoryConsole::new(backend.clone());

        backend.lists_down.store(true, Ordering::SeqCst);

        orders
            .update_status(&OrderId::new("7"), OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(orders.all()[0].status, OrderStatus::Pending);
        assert_eq!(
            backend.orders.lock().unwrap()[0].status,
            OrderStatus::Delivered
        );

        let mut f = form();
        f.image = Some(ImageUpload::new("kodo.jpg", vec![1]));
        let saved = products.save(FormMode::Create, f).await.unwrap();
        products.delete(&saved.id).await.unwrap();

        let created = categories
            .create(CategoryPayload {
                name: "Oils".to_string(),
                description: None,
                image_url: None,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Oils");

        assert!(orders.reload().await.is_err());
    }
}
