//! Invoice create, update and delete.

use tracing::info;
use validator::Validate;

use super::{messages, paths, ActionError, ActionState, Actions, Completed, Result};
use crate::models::{today, Invoice, InvoiceUpdate, NewInvoice};
use crate::storage::StorageError;
use crate::validation::{field_errors, InvoiceForm};

const REVALIDATE: [&str; 2] = [paths::INVOICES, paths::DASHBOARD];

fn check(form: &InvoiceForm, message: &str) -> Result<()> {
    form.validate().map_err(|e| {
        ActionError::Validation(ActionState::invalid(field_errors(&e), message, form.values()))
    })
}

/// A missing customer is reported on the customer field.
fn write_error(err: StorageError, form: &InvoiceForm, message: &str) -> ActionError {
    match err {
        StorageError::CustomerNotFound(_) => ActionError::Validation(ActionState::invalid(
            [(
                "customer_id".to_string(),
                vec![messages::CUSTOMER_MISSING.to_string()],
            )]
            .into(),
            message,
            form.values(),
        )),
        other => ActionError::database(other, message),
    }
}

impl Actions {
    pub async fn create_invoice(&self, form: InvoiceForm) -> Result<Completed<Invoice>> {
        check(&form, messages::CREATE_INVOICE_MISSING)?;

        let invoice = self
            .storage
            .invoices
            .create(NewInvoice {
                customer_id: form.customer_id.clone(),
                amount: form.amount_cents(),
                status: form.status(),
                date: today(),
            })
            .await
            .map_err(|e| write_error(e, &form, messages::CREATE_INVOICE_DB))?;

        info!(invoice_id = %invoice.id, amount = invoice.amount, "Invoice created");
        self.revalidator.revalidate_all(&REVALIDATE).await;
        Ok(Completed::redirect(invoice, paths::INVOICES))
    }

    pub async fn update_invoice(&self, id: &str, form: InvoiceForm) -> Result<Completed<Invoice>> {
        check(&form, messages::UPDATE_INVOICE_MISSING)?;

        let invoice = self
            .storage
            .invoices
            .update(
                id,
                InvoiceUpdate {
                    customer_id: form.customer_id.clone(),
                    amount: form.amount_cents(),
                    status: form.status(),
                },
            )
            .await
            .map_err(|e| match e {
                StorageError::NotFound { .. } => {
                    ActionError::NotFound(messages::INVOICE_NOT_FOUND.to_string())
                }
                other => write_error(other, &form, messages::UPDATE_INVOICE_DB),
            })?;

        info!(invoice_id = %invoice.id, "Invoice updated");
        self.revalidator.revalidate_all(&REVALIDATE).await;
        Ok(Completed::redirect(invoice, paths::INVOICES))
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<Completed<()>> {
        self.storage.invoices.delete(id).await.map_err(|e| match e {
            e if e.is_not_found() => ActionError::NotFound(messages::INVOICE_NOT_FOUND.to_string()),
            other => ActionError::database(other, messages::DELETE_INVOICE_DB),
        })?;

        info!(invoice_id = %id, "Invoice deleted");
        self.revalidator.revalidate_all(&REVALIDATE).await;
        Ok(Completed::message((), messages::INVOICE_DELETED))
    }
}
