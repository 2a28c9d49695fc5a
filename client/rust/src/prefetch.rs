//! Prefetch tables for likely navigation.
//!
//! Three triggers warm the cache ahead of a page: landing on a route
//! (the data of routes users usually visit next), hovering a navigation
//! link (the data of the linked route) and fetching a query family (data
//! usually shown next to it).

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::key::QueryKey;
use crate::keys;
use crate::policy::QueryPolicy;
use crate::queries::DashboardQueries;

/// Wait after landing on a route before anticipating the next one.
pub const ANTICIPATION_DELAY: Duration = Duration::from_secs(1);

/// A query the dashboard prefetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefetchTarget {
    CardData,
    LatestInvoices,
    Revenue,
    Customers,
    /// Page 1 of the invoices table with an empty search.
    FirstInvoicesPage,
    /// Page count for an empty invoice search.
    InvoicesPages,
}

impl PrefetchTarget {
    pub fn key(&self) -> QueryKey {
        match self {
            PrefetchTarget::CardData => keys::card_data(),
            PrefetchTarget::LatestInvoices => keys::latest_invoices(),
            PrefetchTarget::Revenue => keys::revenue(),
            PrefetchTarget::Customers => keys::customers(),
            PrefetchTarget::FirstInvoicesPage => keys::invoices("", 1),
            PrefetchTarget::InvoicesPages => keys::invoices_pages(""),
        }
    }

    /// Prefetched data younger than this is not fetched again.
    pub fn stale_time(&self) -> Duration {
        match self {
            PrefetchTarget::LatestInvoices => Duration::from_secs(60),
            PrefetchTarget::FirstInvoicesPage => Duration::from_secs(2 * 60),
            PrefetchTarget::CardData
            | PrefetchTarget::Revenue
            | PrefetchTarget::Customers
            | PrefetchTarget::InvoicesPages => Duration::from_secs(5 * 60),
        }
    }
}

/// Targets to warm after landing on `path`.
///
/// Every page except the overview warms the overview's cards and latest
/// invoices, since users return there often.
pub fn anticipated_targets(path: &str) -> Vec<PrefetchTarget> {
    use PrefetchTarget::*;

    let mut targets = Vec::new();
    if path != "/dashboard" {
        targets.extend([CardData, LatestInvoices]);
    }
    match path {
        "/dashboard" => targets.extend([Customers, FirstInvoicesPage]),
        "/dashboard/invoices" => targets.extend([Customers, Revenue]),
        "/dashboard/customers" => targets.extend([FirstInvoicesPage, Revenue]),
        "/dashboard/invoices/create" => targets.push(Customers),
        // CardData repeats the common target above. Targets run in order,
        // so the repeat finds fresh data and fetches nothing.
        "/admin" => targets.extend([CardData, Customers]),
        _ => {}
    }
    targets
}

/// Targets to warm while a link to `route` is hovered.
pub fn hover_targets(route: &str) -> Vec<PrefetchTarget> {
    use PrefetchTarget::*;

    match route {
        "/dashboard" => vec![CardData, LatestInvoices, Revenue],
        "/dashboard/invoices" => vec![FirstInvoicesPage, InvoicesPages],
        "/dashboard/customers" => vec![Customers],
        "/admin" => vec![CardData],
        _ => Vec::new(),
    }
}

/// Targets related to a fetched key's family.
pub fn related_targets(key: &QueryKey) -> Vec<PrefetchTarget> {
    use PrefetchTarget::*;

    match key.family() {
        Some("customers") => vec![FirstInvoicesPage],
        Some("invoices") => vec![Customers],
        Some("dashboard") => vec![LatestInvoices],
        _ => Vec::new(),
    }
}

impl DashboardQueries {
    /// Warm one target. Returns true when data was fetched.
    pub async fn prefetch(&self, target: PrefetchTarget) -> bool {
        let key = target.key();
        let policy = QueryPolicy::for_key(&key).with_stale_time(target.stale_time());
        let client = self.client();
        match target {
            PrefetchTarget::CardData => {
                let fetch = self.fetcher(|b| async move { b.card_data().await });
                client.prefetch_query(&key, policy, fetch).await
            }
            PrefetchTarget::LatestInvoices => {
                let fetch = self.fetcher(|b| async move { b.latest_invoices().await });
                client.prefetch_query(&key, policy, fetch).await
            }
            PrefetchTarget::Revenue => {
                let fetch = self.fetcher(|b| async move { b.revenue().await });
                client.prefetch_query(&key, policy, fetch).await
            }
            PrefetchTarget::Customers => {
                let fetch = self.fetcher(|b| async move { b.customers().await });
                client.prefetch_query(&key, policy, fetch).await
            }
            PrefetchTarget::FirstInvoicesPage => {
                let fetch = self.fetcher(|b| async move { b.invoices("", 1).await });
                client.prefetch_query(&key, policy, fetch).await
            }
            PrefetchTarget::InvoicesPages => {
                let fetch = self.fetcher(|b| async move { b.invoices_pages("").await });
                client.prefetch_query(&key, policy, fetch).await
            }
        }
    }

    /// Warm each target in order. Returns how many fetched.
    pub async fn prefetch_all(&self, targets: Vec<PrefetchTarget>) -> usize {
        let mut fetched = 0;
        for target in targets {
            if self.prefetch(target).await {
                fetched += 1;
            }
        }
        fetched
    }

    /// Warm the data of routes likely visited after `path`.
    pub async fn prefetch_anticipated(&self, path: &str) -> usize {
        let targets = anticipated_targets(path);
        debug!(path, count = targets.len(), "Anticipating next route");
        self.prefetch_all(targets).await
    }

    /// [`DashboardQueries::prefetch_anticipated`] after
    /// [`ANTICIPATION_DELAY`]. Abort the handle when the user navigates
    /// away first.
    pub fn anticipate(&self, path: &str) -> JoinHandle<usize> {
        let queries = self.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(ANTICIPATION_DELAY).await;
            queries.prefetch_anticipated(&path).await
        })
    }

    pub async fn prefetch_on_hover(&self, route: &str) -> usize {
        let targets = hover_targets(route);
        debug!(route, count = targets.len(), "Prefetching hovered route");
        self.prefetch_all(targets).await
    }

    pub async fn prefetch_related(&self, key: &QueryKey) -> usize {
        self.prefetch_all(related_targets(key)).await
    }
}
