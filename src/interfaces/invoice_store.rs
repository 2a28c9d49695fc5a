//! Invoice storage interface.

use async_trait::async_trait;

use super::Result;
use crate::models::{Invoice, InvoiceForm, InvoicePage, InvoiceRow, InvoiceUpdate, NewInvoice};

/// Rows per page of the invoices table.
pub const ITEMS_PER_PAGE: u64 = 6;

/// Interface for invoice persistence.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// One page (1-based) of invoices joined with their customer, newest
    /// first, filtered case-insensitively on customer name, email, amount,
    /// date and status.
    async fn filtered(&self, query: &str, page: u64) -> Result<Vec<InvoiceRow>>;

    /// Number of pages `filtered` can return for `query`.
    async fn total_pages(&self, query: &str) -> Result<u64>;

    /// Offset-based slice for infinite scrolling.
    async fn page_after(&self, query: &str, offset: u64, limit: u64) -> Result<InvoicePage>;

    /// Invoice prepared for the edit form (amount in dollars).
    async fn get_form(&self, id: &str) -> Result<Option<InvoiceForm>>;

    /// Insert an invoice after checking its customer exists, in one
    /// transaction. Returns `CustomerNotFound` when the check fails.
    async fn create(&self, invoice: NewInvoice) -> Result<Invoice>;

    /// Update an invoice with the same customer check.
    async fn update(&self, id: &str, update: InvoiceUpdate) -> Result<Invoice>;

    /// Delete an invoice. Returns `NotFound` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Insert fixture rows, skipping ids that already exist.
    async fn seed(&self, invoices: &[Invoice]) -> Result<()>;
}
