//! Admin product catalog writes.

use tracing::info;
use validator::Validate;

use super::{messages, paths, ActionError, ActionState, Actions, Completed, Result};
use crate::models::Product;
use crate::validation::{field_errors, ProductForm};

fn check(form: &ProductForm) -> Result<()> {
    form.validate().map_err(|e| {
        let values = [
            ("name", form.name.clone()),
            ("price", form.price.clone()),
            ("category", form.category.clone()),
            ("status", form.status.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        ActionError::Validation(ActionState::invalid(
            field_errors(&e),
            messages::PRODUCT_MISSING,
            values,
        ))
    })
}

fn not_found_or(err: crate::storage::StorageError, message: &str) -> ActionError {
    if err.is_not_found() {
        ActionError::NotFound(messages::PRODUCT_NOT_FOUND.to_string())
    } else {
        ActionError::database(err, message)
    }
}

impl Actions {
    pub async fn create_product(&self, form: ProductForm) -> Result<Completed<Product>> {
        let form = form.trimmed();
        check(&form)?;
        let product = self
            .storage
            .products
            .create(form.to_input())
            .await
            .map_err(|e| ActionError::database(e, messages::PRODUCT_DB))?;

        info!(product_id = %product.id, "Product created");
        self.revalidator.revalidate(paths::ADMIN).await;
        Ok(Completed::message(product, messages::PRODUCT_CREATED))
    }

    pub async fn update_product(&self, id: &str, form: ProductForm) -> Result<Completed<Product>> {
        let form = form.trimmed();
        check(&form)?;
        let product = self
            .storage
            .products
            .update(id, form.to_input())
            .await
            .map_err(|e| not_found_or(e, messages::PRODUCT_DB))?;

        info!(product_id = %product.id, "Product updated");
        self.revalidator.revalidate(paths::ADMIN).await;
        Ok(Completed::message(product, messages::PRODUCT_UPDATED))
    }

    pub async fn delete_product(&self, id: &str) -> Result<Completed<()>> {
        self.storage
            .products
            .delete(id)
            .await
            .map_err(|e| not_found_or(e, messages::DELETE_PRODUCT_DB))?;

        info!(product_id = %id, "Product deleted");
        self.revalidator.revalidate(paths::ADMIN).await;
        Ok(Completed::message((), messages::PRODUCT_DELETED))
    }
}
