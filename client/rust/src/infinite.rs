//! Cursor-paged invoice list.
//!
//! Loaded pages live in the cache under [`keys::infinite_invoices`], so
//! invoice revalidation marks them stale like any other invoice query.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::DashboardBackend;
use crate::client::QueryClient;
use crate::error::{ClientError, Result};
use crate::key::QueryKey;
use crate::keys;
use crate::models::{InvoicePage, InvoiceRow};
use crate::queries::DashboardQueries;

/// Page size when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Pages {
    pages: Vec<InvoicePage>,
}

impl Pages {
    /// Cursor of the page after the last loaded one. `Some(0)` before the
    /// first load, `None` once the list is exhausted.
    fn next_cursor(&self) -> Option<u64> {
        match self.pages.last() {
            None => Some(0),
            Some(page) => page.next_cursor,
        }
    }
}

/// Invoice list that grows one page at a time.
pub struct InfiniteInvoices {
    client: QueryClient,
    backend: Arc<dyn DashboardBackend>,
    query: String,
    limit: u64,
}

impl std::fmt::Debug for InfiniteInvoices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfiniteInvoices")
            .field("query", &self.query)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl InfiniteInvoices {
    pub fn new(
        client: QueryClient,
        backend: Arc<dyn DashboardBackend>,
        query: impl Into<String>,
        limit: u64,
    ) -> Result<Self> {
        if limit == 0 {
            return Err(ClientError::InvalidArgument(
                "page size must be positive".to_string(),
            ));
        }
        Ok(Self {
            client,
            backend,
            query: query.into(),
            limit,
        })
    }

    pub fn key(&self) -> QueryKey {
        keys::infinite_invoices(&self.query)
    }

    async fn pages(&self) -> Result<Pages> {
        Ok(self
            .client
            .get_query_data::<Pages>(&self.key())
            .await?
            .unwrap_or_default())
    }

    pub async fn has_next_page(&self) -> Result<bool> {
        Ok(self.pages().await?.next_cursor().is_some())
    }

    pub async fn page_count(&self) -> Result<usize> {
        Ok(self.pages().await?.pages.len())
    }

    /// Load the next page. Returns false when there is nothing left.
    pub async fn fetch_next_page(&mut self) -> Result<bool> {
        let mut pages = self.pages().await?;
        let Some(cursor) = pages.next_cursor() else {
            return Ok(false);
        };
        let page = self
            .backend
            .invoice_page(&self.query, cursor, self.limit)
            .await?;
        debug!(query = %self.query, cursor, rows = page.data.len(), "Loaded invoice page");
        pages.pages.push(page);
        self.client.set_query_data(&self.key(), &pages).await?;
        Ok(true)
    }

    /// Reload as many pages as are loaded now, starting from the first.
    pub async fn refetch(&mut self) -> Result<usize> {
        let wanted = self.pages().await?.pages.len().max(1);
        let mut fresh = Pages::default();
        while fresh.pages.len() < wanted {
            let Some(cursor) = fresh.next_cursor() else {
                break;
            };
            let page = self
                .backend
                .invoice_page(&self.query, cursor, self.limit)
                .await?;
            fresh.pages.push(page);
        }
        let loaded = fresh.pages.len();
        self.client.set_query_data(&self.key(), &fresh).await?;
        Ok(loaded)
    }

    /// Every loaded row, in page order.
    pub async fn items(&self) -> Result<Vec<InvoiceRow>> {
        Ok(self
            .pages()
            .await?
            .pages
            .into_iter()
            .flat_map(|page| page.data)
            .collect())
    }

    /// True when the loaded pages were invalidated since they were fetched.
    pub async fn is_stale(&self) -> bool {
        self.client
            .query_state(&self.key())
            .await
            .map_or(true, |state| state.is_stale)
    }
}

impl DashboardQueries {
    /// Infinite invoice list for `query` with the default page size.
    pub fn infinite_invoices(&self, query: impl Into<String>) -> InfiniteInvoices {
        InfiniteInvoices {
            client: self.client().clone(),
            backend: self.backend().clone(),
            query: query.into(),
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}
