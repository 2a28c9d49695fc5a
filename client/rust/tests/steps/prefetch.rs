//! Prefetch step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};
use invoice_dashboard_client::models::CustomerField;
use invoice_dashboard_client::{keys, DashboardQueries, QueryKey};

use super::{dashboard, list, method, MockBackend};

/// Test context for prefetch scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct PrefetchWorld {
    backend: Arc<MockBackend>,
    queries: DashboardQueries,
}

impl PrefetchWorld {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let queries = dashboard(&backend);
        Self { backend, queries }
    }
}

// --- Given steps ---

#[given("a dashboard client with sample data")]
async fn given_sample_data(world: &mut PrefetchWorld) {
    world.backend.with_customers(&["Alice", "Carol"]);
    world.backend.with_invoices(8);
}

#[given("the customer list has been read")]
async fn given_customer_list_read(world: &mut PrefetchWorld) {
    world.queries.customers().await.unwrap();
}

#[given(expr = "the server fails {word} {int} time(s) with status {int}")]
async fn given_server_fails(world: &mut PrefetchWorld, name: String, times: usize, status: u16) {
    world.backend.fail(&method(&name), status, times);
}

// --- When steps ---

#[when(expr = "the user lands on {string}")]
async fn when_user_lands(world: &mut PrefetchWorld, path: String) {
    world.queries.prefetch_anticipated(&path).await;
}

#[when(expr = "the user lands on {string} and leaves at once")]
async fn when_user_lands_and_leaves(world: &mut PrefetchWorld, path: String) {
    let handle = world.queries.anticipate(&path);
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
}

#[when(expr = "the user hovers the link to {string}")]
async fn when_user_hovers(world: &mut PrefetchWorld, route: String) {
    world.queries.prefetch_on_hover(&route).await;
}

#[when(expr = "related data for {string} is prefetched")]
async fn when_related_prefetched(world: &mut PrefetchWorld, family: String) {
    world
        .queries
        .prefetch_related(&QueryKey::of([family.as_str()]))
        .await;
}

// --- Then steps ---

#[then(expr = "the server was asked for exactly {string}")]
async fn then_asked_exactly(world: &mut PrefetchWorld, expected: String) {
    let expected = list(&expected);
    for name in &expected {
        assert_eq!(world.backend.calls(name), 1, "calls to {}", name);
    }
    assert_eq!(world.backend.total_calls(), expected.len());
}

#[then(expr = "the server was asked for {word} {int} time(s)")]
async fn then_server_asked(world: &mut PrefetchWorld, name: String, times: usize) {
    assert_eq!(world.backend.calls(&method(&name)), times);
}

#[then("the server was not asked for anything")]
async fn then_not_asked(world: &mut PrefetchWorld) {
    assert_eq!(world.backend.total_calls(), 0);
}

#[then("customers are not cached")]
async fn then_customers_not_cached(world: &mut PrefetchWorld) {
    let cached: Option<Vec<CustomerField>> = world
        .queries
        .client()
        .get_query_data(&keys::customers())
        .await
        .unwrap();
    assert_eq!(cached, None);
}
