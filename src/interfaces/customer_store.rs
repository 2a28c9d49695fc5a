//! Customer storage interface.

use async_trait::async_trait;

use super::Result;
use crate::models::{Customer, CustomerField, CustomerTableRow, CustomerUpdate, NewCustomer};

/// Interface for customer persistence.
///
/// Implementations:
/// - `SqlCustomerStore<Sqlite>` / `SqlCustomerStore<Postgres>`
/// - `MockStore`: in-memory tables
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers ordered by name.
    async fn list_all(&self) -> Result<Vec<Customer>>;

    /// Id and name of every customer, ordered by name.
    async fn list_fields(&self) -> Result<Vec<CustomerField>>;

    /// Customers whose name, email or company contains `query`
    /// (case-insensitive), with invoice counts and per-status totals.
    async fn filtered_table(&self, query: &str) -> Result<Vec<CustomerTableRow>>;

    /// Fetch one customer. `None` when absent.
    async fn get(&self, id: &str) -> Result<Option<Customer>>;

    /// Insert a customer and return it with its generated id.
    async fn create(&self, customer: NewCustomer) -> Result<Customer>;

    /// Replace a customer's editable fields.
    ///
    /// Returns `NotFound` when no row matched.
    async fn update(&self, id: &str, update: CustomerUpdate) -> Result<Customer>;

    /// Delete a customer and all of its invoices in one transaction.
    ///
    /// Returns the number of invoices removed. When the customer does not
    /// exist the transaction is rolled back and `NotFound` is returned.
    async fn delete_with_invoices(&self, id: &str) -> Result<u64>;

    /// Insert fixture rows, skipping ids that already exist.
    async fn seed(&self, customers: &[Customer]) -> Result<()>;
}
