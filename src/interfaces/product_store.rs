//! Product catalog storage interface.

use async_trait::async_trait;

use super::Result;
use crate::models::{Product, ProductInput};

/// Admin-managed product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products ordered by newest first, optionally restricted to a category.
    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>>;

    async fn get(&self, id: &str) -> Result<Option<Product>>;

    async fn create(&self, input: ProductInput) -> Result<Product>;

    /// Replace every editable field and bump `updated_at`.
    async fn update(&self, id: &str, input: ProductInput) -> Result<Product>;

    async fn delete(&self, id: &str) -> Result<()>;
}
