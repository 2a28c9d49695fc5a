//! Query cache step definitions.

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when, World};
use invoice_dashboard_client::models::Revenue;
use invoice_dashboard_client::{
    keys, ClientError, DashboardBackend, DashboardQueries, QueryKey, QueryPolicy,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::{dashboard, list, method, MockBackend};

/// Test context for query cache scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct CacheWorld {
    backend: Arc<MockBackend>,
    queries: DashboardQueries,
    last_error: Option<ClientError>,
    held: Option<Arc<Notify>>,
    pending: Option<JoinHandle<Result<Vec<Revenue>, ClientError>>>,
}

impl CacheWorld {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let queries = dashboard(&backend);
        Self {
            backend,
            queries,
            last_error: None,
            held: None,
            pending: None,
        }
    }

    async fn read_customers_with(&mut self, policy: QueryPolicy) {
        let backend = self.backend.clone();
        let result = self
            .queries
            .client()
            .fetch_query(&keys::customers(), policy, move || {
                let backend = backend.clone();
                async move { backend.customers().await }
            })
            .await;
        self.last_error = result.err();
    }

    async fn observe(&self, key: QueryKey, policy: QueryPolicy) {
        let backend = self.backend.clone();
        if key == keys::revenue() {
            self.queries
                .client()
                .observe(key, policy, move || {
                    let backend = backend.clone();
                    async move { backend.revenue().await }
                })
                .await;
        } else {
            self.queries
                .client()
                .observe(key, policy, move || {
                    let backend = backend.clone();
                    async move { backend.customers().await }
                })
                .await;
        }
    }
}

fn key_named(name: &str) -> QueryKey {
    match name {
        "customers" => keys::customers(),
        "revenue" => keys::revenue(),
        other => panic!("unknown query {}", other),
    }
}

// --- Given steps ---

#[given(expr = "a dashboard client with customers {string}")]
async fn given_client_with_customers(world: &mut CacheWorld, names: String) {
    let names = list(&names);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    world.backend.with_customers(&names);
}

#[given("the customers and latest invoices have been read")]
async fn given_customers_and_latest_read(world: &mut CacheWorld) {
    world.queries.customers().await.unwrap();
    world.queries.latest_invoices().await.unwrap();
}

#[given(expr = "the server fails {word} {int} time(s) with status {int}")]
async fn given_server_fails(world: &mut CacheWorld, name: String, times: usize, status: u16) {
    world.backend.fail(&method(&name), status, times);
}

#[given("the server holds the next revenue request")]
async fn given_server_holds_revenue(world: &mut CacheWorld) {
    world.held = Some(world.backend.hold("revenue"));
}

#[given(expr = "{word} is/are observed with stale time {int}")]
async fn given_observed_with_stale_time(world: &mut CacheWorld, name: String, millis: u64) {
    let policy = QueryPolicy::default().with_stale_time(Duration::from_millis(millis));
    world.observe(key_named(&name), policy).await;
}

#[given(expr = "{word} is/are observed with the default policy")]
async fn given_observed_default(world: &mut CacheWorld, name: String) {
    world.observe(key_named(&name), QueryPolicy::default()).await;
}

#[given(expr = "{word} is/are observed every {int} milliseconds")]
async fn given_observed_every(world: &mut CacheWorld, name: String, millis: u64) {
    let policy =
        QueryPolicy::default().with_refetch_interval(Some(Duration::from_millis(millis)));
    world.observe(key_named(&name), policy).await;
}

#[given(expr = "{word} is/are observed with gc time {int}")]
async fn given_observed_with_gc(world: &mut CacheWorld, name: String, millis: u64) {
    let policy = QueryPolicy::default().with_gc_time(Duration::from_millis(millis));
    world.observe(key_named(&name), policy).await;
}

#[given(expr = "customers were read with gc time {int}")]
async fn given_customers_read_with_gc(world: &mut CacheWorld, millis: u64) {
    let policy = QueryPolicy::default().with_gc_time(Duration::from_millis(millis));
    world.read_customers_with(policy).await;
    assert!(world.last_error.is_none());
}

// --- When steps ---

#[given(expr = "the customers are read {int} time(s)")]
async fn given_customers_read(world: &mut CacheWorld, times: usize) {
    read_customers(world, times).await;
}

#[when(expr = "the customers are read {int} time(s)")]
async fn when_customers_read(world: &mut CacheWorld, times: usize) {
    read_customers(world, times).await;
}

async fn read_customers(world: &mut CacheWorld, times: usize) {
    for _ in 0..times {
        if let Err(e) = world.queries.customers().await {
            world.last_error = Some(e);
        }
    }
}

#[when("the customers and latest invoices are read again")]
async fn when_customers_and_latest_read_again(world: &mut CacheWorld) {
    world.queries.customers().await.unwrap();
    world.queries.latest_invoices().await.unwrap();
}

#[when(expr = "queries under {string} are invalidated")]
async fn when_invalidated(world: &mut CacheWorld, prefix: String) {
    world
        .queries
        .client()
        .invalidate_queries(&QueryKey::of([prefix.as_str()]))
        .await;
}

#[when(expr = "queries under {string} are cancelled")]
async fn when_cancelled(world: &mut CacheWorld, prefix: String) {
    let cancelled = world
        .queries
        .client()
        .cancel_queries(&QueryKey::of([prefix.as_str()]))
        .await;
    assert_eq!(cancelled, 1);
}

#[when("the revenue is read")]
async fn when_revenue_read(world: &mut CacheWorld) {
    world.last_error = world.queries.revenue().await.err();
}

#[when("the revenue read starts")]
async fn when_revenue_read_starts(world: &mut CacheWorld) {
    let queries = world.queries.clone();
    world.pending = Some(tokio::spawn(async move { queries.revenue().await }));
    world.backend.wait_for_calls("revenue", 1).await;
}

#[when("the revenue is prefetched")]
async fn when_revenue_prefetched(world: &mut CacheWorld) {
    let backend = world.backend.clone();
    let fetched = world
        .queries
        .client()
        .prefetch_query(&keys::revenue(), QueryPolicy::default(), move || {
            let backend = backend.clone();
            async move { backend.revenue().await }
        })
        .await;
    assert!(!fetched);
}

#[when("the server releases the held request")]
async fn when_server_releases(world: &mut CacheWorld) {
    world.held.take().expect("no held request").notify_one();
}

#[when("the window regains focus")]
async fn when_window_focus(world: &mut CacheWorld) {
    world.queries.client().window_focused().await;
}

#[when("the network reconnects")]
async fn when_network_reconnects(world: &mut CacheWorld) {
    world.queries.client().reconnected().await;
}

#[when(expr = "{int} milliseconds pass")]
async fn when_time_passes(_world: &mut CacheWorld, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[when("garbage is collected")]
async fn when_garbage_collected(world: &mut CacheWorld) {
    world.queries.client().collect_garbage().await;
}

#[when(expr = "{word} is/are no longer observed")]
async fn when_unobserved(world: &mut CacheWorld, name: String) {
    world.queries.client().unobserve(&key_named(&name)).await;
}

// --- Then steps ---

#[then(expr = "the server was asked for {word} {int} time(s)")]
async fn then_server_asked(world: &mut CacheWorld, name: String, times: usize) {
    assert_eq!(world.backend.calls(&method(&name)), times, "calls to {}", name);
}

#[then(expr = "the server was asked for latest invoices {int} time(s)")]
async fn then_server_asked_latest(world: &mut CacheWorld, times: usize) {
    assert_eq!(world.backend.calls("latest_invoices"), times);
}

#[then(expr = "the server was asked for {word} at least {int} times")]
async fn then_server_asked_at_least(world: &mut CacheWorld, name: String, times: usize) {
    let calls = world.backend.calls(&method(&name));
    assert!(calls >= times, "{} called {} times", name, calls);
}

#[then("the read succeeds")]
async fn then_read_succeeds(world: &mut CacheWorld) {
    assert!(world.last_error.is_none(), "{:?}", world.last_error);
}

#[then(expr = "the read fails with status {int}")]
async fn then_read_fails(world: &mut CacheWorld, status: u16) {
    let error = world.last_error.as_ref().expect("read should fail");
    assert_eq!(error.status(), Some(status));
}

#[then("the pending read was cancelled")]
async fn then_pending_cancelled(world: &mut CacheWorld) {
    let handle = world.pending.take().expect("no pending read");
    let result = handle.await.unwrap();
    assert_eq!(result, Err(ClientError::Cancelled));
}

#[then("the pending read succeeds")]
async fn then_pending_succeeds(world: &mut CacheWorld) {
    let handle = world.pending.take().expect("no pending read");
    let revenue = handle.await.unwrap().expect("pending read");
    assert_eq!(revenue[0].revenue, 100);
}

#[then("no revenue is cached")]
async fn then_no_revenue(world: &mut CacheWorld) {
    let cached: Option<Vec<Revenue>> = world
        .queries
        .client()
        .get_query_data(&keys::revenue())
        .await
        .unwrap();
    assert_eq!(cached, None);
}

#[then(expr = "the cached revenue is {int}")]
async fn then_cached_revenue(world: &mut CacheWorld, amount: i64) {
    let cached: Vec<Revenue> = world
        .queries
        .client()
        .get_query_data(&keys::revenue())
        .await
        .unwrap()
        .expect("revenue cached");
    assert_eq!(cached[0].revenue, amount);
}

#[then(expr = "{word} is/are no longer cached")]
async fn then_not_cached(world: &mut CacheWorld, name: String) {
    assert!(world.queries.client().query_state(&key_named(&name)).await.is_none());
}

#[then(expr = "{word} is/are still cached")]
async fn then_still_cached(world: &mut CacheWorld, name: String) {
    assert!(world.queries.client().query_state(&key_named(&name)).await.is_some());
}
