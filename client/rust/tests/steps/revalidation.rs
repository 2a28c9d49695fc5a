//! Revalidation step definitions.

use std::sync::Arc;

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use invoice_dashboard_client::{
    follow_revalidations, keys, DashboardQueries, QueryKey, SseDecoder,
};

use super::{dashboard, list, method, MockBackend};

/// Test context for revalidation scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct RevalidationWorld {
    backend: Arc<MockBackend>,
    queries: DashboardQueries,
}

impl RevalidationWorld {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let queries = dashboard(&backend);
        Self { backend, queries }
    }
}

/// Short names for the cached queries.
fn named_keys() -> Vec<(&'static str, QueryKey)> {
    vec![
        ("revenue", keys::revenue()),
        ("latest", keys::latest_invoices()),
        ("cards", keys::card_data()),
        ("customers", keys::customers()),
        ("invoices", keys::invoices("", 1)),
        ("pages", keys::invoices_pages("")),
    ]
}

// --- Given steps ---

#[given("a dashboard client with every query cached")]
async fn given_everything_cached(world: &mut RevalidationWorld) {
    world.backend.with_customers(&["Alice", "Carol"]);
    world.backend.with_invoices(8);
    let queries = &world.queries;
    queries.revenue().await.unwrap();
    queries.latest_invoices().await.unwrap();
    queries.card_data().await.unwrap();
    queries.customers().await.unwrap();
    queries.invoices("", 1).await.unwrap();
    queries.invoices_pages("").await.unwrap();
}

#[given("the overview is on screen")]
async fn given_overview_on_screen(world: &mut RevalidationWorld) {
    world.queries.watch_overview().await;
}

// --- When steps ---

#[when(expr = "the server revalidates {string}")]
async fn when_server_revalidates(world: &mut RevalidationWorld, path: String) {
    world.queries.client().apply_revalidation(&path).await;
}

#[when("the event stream delivers")]
async fn when_event_stream_delivers(world: &mut RevalidationWorld, step: &Step) {
    let body = step.docstring.clone().expect("event stream body");
    let mut decoder = SseDecoder::default();
    let notices = decoder.push(format!("{}\n\n", body).as_bytes());
    let applied = follow_revalidations(
        world.queries.client().clone(),
        futures::stream::iter(notices.into_iter().map(Ok)),
    )
    .await;
    assert_eq!(applied, 1);
}

// --- Then steps ---

#[then(expr = "exactly {string} are stale")]
async fn then_exactly_stale(world: &mut RevalidationWorld, expected: String) {
    let expected = list(&expected);
    for (name, key) in named_keys() {
        let state = world
            .queries
            .client()
            .query_state(&key)
            .await
            .expect("query cached");
        assert_eq!(
            state.is_stale,
            expected.iter().any(|e| e == name),
            "staleness of {}",
            name
        );
    }
}

#[then(expr = "the server was asked for {word} {int} time(s)")]
async fn then_server_asked(world: &mut RevalidationWorld, name: String, times: usize) {
    assert_eq!(world.backend.calls(&method(&name)), times);
}

#[then(expr = "{word} is fresh")]
async fn then_fresh(world: &mut RevalidationWorld, name: String) {
    let key = named_keys()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, key)| key)
        .expect("known query");
    let state = world.queries.client().query_state(&key).await.unwrap();
    assert!(!state.is_stale);
}
