//! Server actions.
//!
//! Each action validates a submitted form, performs the write, marks the
//! affected paths for revalidation and reports where the browser should
//! go next. Validation failures never reach storage; database failures are
//! logged and surfaced as a generic banner message.

mod auth;
mod customers;
mod invoices;
mod products;
mod profile;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::auth::SessionManager;
use crate::revalidation::Revalidator;
use crate::storage::{Storage, StorageError};
use crate::upload::{UploadError, UploadStore};
use crate::validation::FieldErrors;

pub use auth::SignedIn;

/// Paths revalidated by the actions.
pub mod paths {
    pub const DASHBOARD: &str = "/dashboard";
    pub const INVOICES: &str = "/dashboard/invoices";
    pub const CUSTOMERS: &str = "/dashboard/customers";
    pub const PROFILE: &str = "/profile";
    pub const ADMIN: &str = "/admin";
}

/// Banner messages.
pub mod messages {
    pub const CREATE_INVOICE_MISSING: &str = "Missing Fields. Failed to Create Invoice.";
    pub const UPDATE_INVOICE_MISSING: &str = "Missing Fields. Failed to Update Invoice.";
    pub const CREATE_INVOICE_DB: &str = "Database Error: Failed to Create Invoice.";
    pub const UPDATE_INVOICE_DB: &str = "Database Error: Failed to Update Invoice.";
    pub const DELETE_INVOICE_DB: &str = "Database Error: Failed to Delete Invoice.";
    pub const INVOICE_DELETED: &str = "Deleted Invoice.";
    pub const INVOICE_NOT_FOUND: &str = "Invoice not found.";
    pub const CUSTOMER_MISSING: &str = "Customer not found.";

    pub const CREATE_CUSTOMER_MISSING: &str = "Missing Fields. Failed to Create Customer.";
    pub const UPDATE_CUSTOMER_MISSING: &str = "Missing Fields. Failed to Update Customer.";
    pub const CREATE_CUSTOMER_DB: &str = "Database Error: Failed to Create Customer.";
    pub const UPDATE_CUSTOMER_DB: &str = "Database Error: Failed to Update Customer.";
    pub const DELETE_CUSTOMER_DB: &str = "Database Error: Failed to Delete Customer.";
    pub const CUSTOMER_DELETED: &str = "Customer deleted successfully.";
    pub const CUSTOMER_NOT_FOUND: &str = "Customer not found.";
    pub const UPLOAD_FAILED: &str = "Failed to upload image.";

    pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
    pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";
    pub const SIGNUP_MISSING: &str = "Missing Fields. Failed to Sign Up.";
    pub const EMAIL_TAKEN: &str = "An account with this email already exists";

    pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
    pub const PROFILE_MISSING: &str = "Missing Fields. Failed to Update Profile.";
    pub const PROFILE_FAILED: &str = "Failed to update profile. Please try again.";

    pub const PRODUCT_MISSING: &str = "Missing Fields. Failed to Save Product.";
    pub const PRODUCT_DB: &str = "Database Error: Failed to Save Product.";
    pub const DELETE_PRODUCT_DB: &str = "Database Error: Failed to Delete Product.";
    pub const PRODUCT_NOT_FOUND: &str = "Product not found.";
    pub const PRODUCT_CREATED: &str = "Product created successfully.";
    pub const PRODUCT_UPDATED: &str = "Product updated successfully.";
    pub const PRODUCT_DELETED: &str = "Product deleted successfully.";
}

/// Form state handed back for re-rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub errors: FieldErrors,
    pub message: Option<String>,
    /// Raw submitted values, so the form keeps what the user typed.
    pub values: BTreeMap<String, String>,
}

impl ActionState {
    pub fn invalid(errors: FieldErrors, message: &str, values: BTreeMap<String, String>) -> Self {
        Self {
            errors,
            message: Some(message.to_string()),
            values,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result type for actions.
pub type Result<T> = std::result::Result<T, ActionError>;

/// Why an action did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Input rejected; nothing was written.
    #[error("{}", .0.message.as_deref().unwrap_or("Invalid input"))]
    Validation(ActionState),

    /// Sign-in refused.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Storage failed; any transaction was rolled back.
    #[error("{0}")]
    Database(String),
}

impl ActionError {
    /// Log `err` and replace it with a generic message.
    fn database(err: StorageError, message: &str) -> Self {
        error!(error = %err, "{}", message);
        ActionError::Database(message.to_string())
    }

    /// Upload rejected before any write.
    fn upload(err: UploadError, message: &str, values: BTreeMap<String, String>) -> Self {
        match err {
            UploadError::Io(e) => {
                error!(error = %e, "Avatar upload failed");
                ActionError::Database(messages::UPLOAD_FAILED.to_string())
            }
            rejected => ActionError::Validation(ActionState::invalid(
                FieldErrors::from([("image".to_string(), vec![rejected.to_string()])]),
                message,
                values,
            )),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// A completed action: its result and the follow-up for the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub value: T,
    pub redirect_to: Option<String>,
    pub message: Option<String>,
}

impl<T> Completed<T> {
    fn redirect(value: T, to: &str) -> Self {
        Self {
            value,
            redirect_to: Some(to.to_string()),
            message: None,
        }
    }

    fn message(value: T, message: &str) -> Self {
        Self {
            value,
            redirect_to: None,
            message: Some(message.to_string()),
        }
    }
}

/// Everything the actions need, shared across requests.
#[derive(Clone)]
pub struct Actions {
    storage: Storage,
    revalidator: Revalidator,
    uploads: Arc<UploadStore>,
    sessions: Arc<SessionManager>,
}

impl Actions {
    pub fn new(
        storage: Storage,
        revalidator: Revalidator,
        uploads: Arc<UploadStore>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            storage,
            revalidator,
            uploads,
            sessions,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn revalidator(&self) -> &Revalidator {
        &self.revalidator
    }
}
