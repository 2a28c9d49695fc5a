//! Infinite invoice list step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};
use invoice_dashboard_client::{DashboardQueries, InfiniteInvoices};

use super::{dashboard, MockBackend};

/// Test context for infinite list scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct InfiniteWorld {
    backend: Arc<MockBackend>,
    queries: DashboardQueries,
    list: Option<InfiniteInvoices>,
    last_fetched: bool,
    reloaded: usize,
}

impl InfiniteWorld {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let queries = dashboard(&backend);
        Self {
            backend,
            queries,
            list: None,
            last_fetched: false,
            reloaded: 0,
        }
    }

    fn list(&mut self) -> &mut InfiniteInvoices {
        self.list.as_mut().expect("no infinite list")
    }
}

// --- Given steps ---

#[given(expr = "the server has {int} invoices")]
async fn given_invoices(world: &mut InfiniteWorld, count: usize) {
    world.backend.with_invoices(count);
}

#[given(expr = "an infinite invoice list with page size {int}")]
async fn given_list(world: &mut InfiniteWorld, size: u64) {
    let list = InfiniteInvoices::new(
        world.queries.client().clone(),
        world.queries.backend().clone(),
        "",
        size,
    )
    .unwrap();
    world.list = Some(list);
}

// --- When steps ---

#[when("the next page is fetched")]
async fn when_next_page(world: &mut InfiniteWorld) {
    world.last_fetched = world.list().fetch_next_page().await.unwrap();
}

#[when(expr = "the server revalidates {string}")]
async fn when_server_revalidates(world: &mut InfiniteWorld, path: String) {
    world.queries.client().apply_revalidation(&path).await;
}

#[when("the list is refetched")]
async fn when_list_refetched(world: &mut InfiniteWorld) {
    world.reloaded = world.list().refetch().await.unwrap();
}

// --- Then steps ---

#[then(expr = "{int} invoices are loaded")]
async fn then_loaded(world: &mut InfiniteWorld, count: usize) {
    assert_eq!(world.list().items().await.unwrap().len(), count);
}

#[then("there is a next page")]
async fn then_has_next(world: &mut InfiniteWorld) {
    assert!(world.list().has_next_page().await.unwrap());
}

#[then("there is no next page")]
async fn then_no_next(world: &mut InfiniteWorld) {
    assert!(!world.list().has_next_page().await.unwrap());
}

#[then("no page was fetched")]
async fn then_nothing_fetched(world: &mut InfiniteWorld) {
    assert!(!world.last_fetched);
}

#[then(expr = "the server was asked for {int} pages")]
async fn then_pages_requested(world: &mut InfiniteWorld, count: usize) {
    assert_eq!(world.backend.calls("invoice_page"), count);
}

#[then(expr = "the loaded invoice ids run from {string} to {string}")]
async fn then_ids_run(world: &mut InfiniteWorld, first: String, last: String) {
    let items = world.list().items().await.unwrap();
    assert_eq!(items.first().map(|row| row.id.as_str()), Some(first.as_str()));
    assert_eq!(items.last().map(|row| row.id.as_str()), Some(last.as_str()));
    assert_eq!(items.len(), 20);
}

#[then("the loaded pages are stale")]
async fn then_stale(world: &mut InfiniteWorld) {
    assert!(world.list().is_stale().await);
}

#[then("the loaded pages are fresh")]
async fn then_fresh(world: &mut InfiniteWorld) {
    assert!(!world.list().is_stale().await);
}

#[then(expr = "{int} pages are reloaded")]
async fn then_reloaded(world: &mut InfiniteWorld, count: usize) {
    assert_eq!(world.reloaded, count);
}
