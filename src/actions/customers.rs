//! Customer create, update and cascading delete.

use tracing::info;
use validator::Validate;

use super::{messages, paths, ActionError, ActionState, Actions, Completed, Result};
use crate::models::{Customer, CustomerUpdate, NewCustomer, DEFAULT_CUSTOMER_IMAGE};
use crate::upload::UploadedFile;
use crate::validation::{field_errors, CustomerForm};

impl Actions {
    /// Validate the fields, then the avatar, then store the avatar. Any
    /// rejection happens before the row is written; a failed row write
    /// discards the stored avatar.
    async fn customer_image(
        &self,
        form: &CustomerForm,
        image: Option<&UploadedFile>,
        missing: &str,
    ) -> Result<Option<String>> {
        form.validate().map_err(|e| {
            ActionError::Validation(ActionState::invalid(field_errors(&e), missing, form.values()))
        })?;

        self.uploads
            .save(image)
            .await
            .map_err(|e| ActionError::upload(e, missing, form.values()))
    }

    pub async fn create_customer(
        &self,
        form: CustomerForm,
        image: Option<&UploadedFile>,
    ) -> Result<Completed<Customer>> {
        let form = form.trimmed();
        let image_url = self
            .customer_image(&form, image, messages::CREATE_CUSTOMER_MISSING)
            .await?;

        let customer = self
            .storage
            .customers
            .create(NewCustomer {
                name: form.name.clone(),
                email: form.email.clone(),
                image_url: image_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CUSTOMER_IMAGE.to_string()),
                status: form.status(),
                phone: form.phone.clone(),
                company: form.company.clone(),
                location: form.location.clone(),
            })
            .await;
        let customer = match customer {
            Ok(customer) => customer,
            Err(e) => {
                self.uploads.discard(image_url.as_deref()).await;
                return Err(ActionError::database(e, messages::CREATE_CUSTOMER_DB));
            }
        };

        info!(customer_id = %customer.id, "Customer created");
        self.revalidator.revalidate(paths::CUSTOMERS).await;
        Ok(Completed::redirect(customer, paths::CUSTOMERS))
    }

    pub async fn update_customer(
        &self,
        id: &str,
        form: CustomerForm,
        image: Option<&UploadedFile>,
    ) -> Result<Completed<Customer>> {
        let form = form.trimmed();
        let image_url = self
            .customer_image(&form, image, messages::UPDATE_CUSTOMER_MISSING)
            .await?;

        let customer = self
            .storage
            .customers
            .update(
                id,
                CustomerUpdate {
                    name: form.name.clone(),
                    email: form.email.clone(),
                    status: form.status(),
                    phone: form.phone.clone(),
                    company: form.company.clone(),
                    location: form.location.clone(),
                    image_url: image_url.clone(),
                },
            )
            .await;
        let customer = match customer {
            Ok(customer) => customer,
            Err(e) => {
                self.uploads.discard(image_url.as_deref()).await;
                return Err(match e {
                    e if e.is_not_found() => {
                        ActionError::NotFound(messages::CUSTOMER_NOT_FOUND.to_string())
                    }
                    other => ActionError::database(other, messages::UPDATE_CUSTOMER_DB),
                });
            }
        };

        info!(customer_id = %customer.id, "Customer updated");
        self.revalidator.revalidate(paths::CUSTOMERS).await;
        Ok(Completed::redirect(customer, paths::CUSTOMERS))
    }

    /// Delete the customer and every invoice that references it.
    pub async fn delete_customer(&self, id: &str) -> Result<Completed<u64>> {
        let removed_invoices = self
            .storage
            .customers
            .delete_with_invoices(id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => {
                    ActionError::NotFound(messages::CUSTOMER_NOT_FOUND.to_string())
                }
                other => ActionError::database(other, messages::DELETE_CUSTOMER_DB),
            })?;

        info!(customer_id = %id, removed_invoices, "Customer deleted");
        self.revalidator
            .revalidate_all(&[paths::CUSTOMERS, paths::INVOICES, paths::DASHBOARD])
            .await;
        Ok(Completed::message(removed_invoices, messages::CUSTOMER_DELETED))
    }
}
