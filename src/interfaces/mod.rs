//! Abstract interfaces for the data-access layer.
//!
//! These traits define the contracts for:
//! - Customer persistence and the filtered customers table
//! - Invoice persistence, search and paging
//! - Dashboard aggregates (revenue, latest invoices, cards)
//! - User accounts and profiles
//! - The admin product catalog
//!
//! Each trait has a SQL implementation per backend (`storage::sql`) and an
//! in-memory implementation (`storage::mock`).

pub mod customer_store;
pub mod dashboard_store;
pub mod invoice_store;
pub mod product_store;
pub mod user_store;

pub use customer_store::CustomerStore;
pub use dashboard_store::DashboardStore;
pub use invoice_store::{InvoiceStore, ITEMS_PER_PAGE};
pub use product_store::ProductStore;
pub use user_store::UserStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Invoice write referenced a customer that does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StorageError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for the miss variants that callers report as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound { .. } | StorageError::CustomerNotFound(_)
        )
    }
}

impl From<crate::models::UnknownVariant> for StorageError {
    fn from(err: crate::models::UnknownVariant) -> Self {
        StorageError::InvalidRow(err.to_string())
    }
}
