//! Dashboard aggregate queries.

use async_trait::async_trait;

use super::Result;
use crate::models::{CardTotals, LatestInvoice, Revenue};

/// Read-only aggregates shown on the overview page.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Monthly revenue rows in insertion order.
    async fn revenue(&self) -> Result<Vec<Revenue>>;

    /// The five most recent invoices by date.
    async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>>;

    /// Invoice and customer counts plus paid/pending sums.
    async fn card_totals(&self) -> Result<CardTotals>;

    /// Insert revenue fixture rows, skipping months that already exist.
    async fn seed_revenue(&self, revenue: &[Revenue]) -> Result<()>;
}
