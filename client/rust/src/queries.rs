//! Typed dashboard queries and mutations over a [`QueryClient`].

use std::future::Future;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::backend::DashboardBackend;
use crate::client::QueryClient;
use crate::error::Result;
use crate::key::QueryKey;
use crate::keys;
use crate::models::{
    CardData, Customer, CustomerField, CustomerInput, CustomerRow, Invoice, InvoiceForm,
    InvoiceInput, InvoiceRow, LatestInvoice, Revenue,
};
use crate::mutation::MutationOutcome;
use crate::policy::QueryPolicy;

/// Prefix of ids given to optimistically created rows.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Placeholder id for a row the server has not confirmed yet.
pub fn temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Dashboard data access with caching.
#[derive(Clone)]
pub struct DashboardQueries {
    client: QueryClient,
    backend: Arc<dyn DashboardBackend>,
}

impl std::fmt::Debug for DashboardQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardQueries")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl DashboardQueries {
    pub fn new(client: QueryClient, backend: Arc<dyn DashboardBackend>) -> Self {
        Self { client, backend }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn backend(&self) -> &Arc<dyn DashboardBackend> {
        &self.backend
    }

    /// Bind a backend call into a repeatable fetcher.
    pub(crate) fn fetcher<T, F, Fut>(&self, call: F) -> impl Fn() -> Fut + Send + Sync + 'static
    where
        F: Fn(Arc<dyn DashboardBackend>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let backend = self.backend.clone();
        move || call(backend.clone())
    }

    pub async fn revenue(&self) -> Result<Vec<Revenue>> {
        let key = keys::revenue();
        let fetch = self.fetcher(|b| async move { b.revenue().await });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        let key = keys::latest_invoices();
        let fetch = self.fetcher(|b| async move { b.latest_invoices().await });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn card_data(&self) -> Result<CardData> {
        let key = keys::card_data();
        let fetch = self.fetcher(|b| async move { b.card_data().await });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn invoices(&self, query: &str, page: u64) -> Result<Vec<InvoiceRow>> {
        let key = keys::invoices(query, page);
        let query = query.to_string();
        let fetch = self.fetcher(move |b| {
            let query = query.clone();
            async move { b.invoices(&query, page).await }
        });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn invoices_pages(&self, query: &str) -> Result<u64> {
        let key = keys::invoices_pages(query);
        let query = query.to_string();
        let fetch = self.fetcher(move |b| {
            let query = query.clone();
            async move { b.invoices_pages(&query).await }
        });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn invoice(&self, id: &str) -> Result<InvoiceForm> {
        let key = keys::invoice(id);
        let id = id.to_string();
        let fetch = self.fetcher(move |b| {
            let id = id.clone();
            async move { b.invoice(&id).await }
        });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn customers(&self) -> Result<Vec<CustomerField>> {
        let key = keys::customers();
        let fetch = self.fetcher(|b| async move { b.customers().await });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    pub async fn filtered_customers(&self, query: &str) -> Result<Vec<CustomerRow>> {
        let key = keys::filtered_customers(query);
        let query = query.to_string();
        let fetch = self.fetcher(move |b| {
            let query = query.clone();
            async move { b.filtered_customers(&query).await }
        });
        self.client.fetch_query(&key, QueryPolicy::for_key(&key), fetch).await
    }

    /// Observe the overview page: revenue, latest invoices and cards, each
    /// refetched on its own interval until [`DashboardQueries::leave_overview`].
    pub async fn watch_overview(&self) {
        let revenue = keys::revenue();
        let fetch = self.fetcher(|b| async move { b.revenue().await });
        self.client
            .observe(revenue.clone(), QueryPolicy::for_key(&revenue), fetch)
            .await;

        let latest = keys::latest_invoices();
        let fetch = self.fetcher(|b| async move { b.latest_invoices().await });
        self.client
            .observe(latest.clone(), QueryPolicy::for_key(&latest), fetch)
            .await;

        let cards = keys::card_data();
        let fetch = self.fetcher(|b| async move { b.card_data().await });
        self.client
            .observe(cards.clone(), QueryPolicy::for_key(&cards), fetch)
            .await;
    }

    pub async fn leave_overview(&self) {
        for key in overview_keys() {
            self.client.unobserve(&key).await;
        }
    }

    /// Create a customer, showing it in the customer list right away under
    /// a temporary id. A failed request restores the list exactly.
    pub async fn create_customer(&self, input: CustomerInput) -> MutationOutcome<Customer> {
        let placeholder = CustomerField {
            id: temp_id(),
            name: input.name.clone(),
        };
        debug!(id = %placeholder.id, "Adding optimistic customer");
        let backend = self.backend.clone();
        self.client
            .mutate(
                &keys::customers(),
                move |current: Option<Vec<CustomerField>>| {
                    let mut customers = current.unwrap_or_default();
                    customers.push(placeholder);
                    customers.sort_by(|a, b| a.name.cmp(&b.name));
                    customers
                },
                async move { backend.create_customer(&input).await },
            )
            .await
    }

    /// Delete a customer, removing it from the customer list right away.
    /// Invoice queries are invalidated once the server confirms.
    pub async fn delete_customer(&self, id: &str) -> MutationOutcome<u64> {
        let backend = self.backend.clone();
        let target = id.to_string();
        let request_id = id.to_string();
        let outcome = self
            .client
            .mutate(
                &keys::customers(),
                move |current: Option<Vec<CustomerField>>| {
                    let mut customers = current.unwrap_or_default();
                    customers.retain(|c| c.id != target);
                    customers
                },
                async move { backend.delete_customer(&request_id).await },
            )
            .await;
        if outcome.is_committed() {
            self.invalidate_all([keys::all_invoices(), keys::dashboard()])
                .await;
        }
        outcome
    }

    /// Create an invoice, then invalidate invoice and card queries.
    pub async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice> {
        let invoice = self.backend.create_invoice(input).await?;
        self.invalidate_all([keys::all_invoices(), keys::dashboard()])
            .await;
        Ok(invoice)
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<()> {
        self.backend.delete_invoice(id).await?;
        self.invalidate_all([keys::all_invoices(), keys::dashboard()])
            .await;
        Ok(())
    }

    async fn invalidate_all(&self, prefixes: impl IntoIterator<Item = QueryKey>) {
        for prefix in prefixes {
            self.client.invalidate_queries(&prefix).await;
        }
    }
}

fn overview_keys() -> [QueryKey; 3] {
    [keys::revenue(), keys::latest_invoices(), keys::card_data()]
}
