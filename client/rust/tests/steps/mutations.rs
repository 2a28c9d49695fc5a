//! Optimistic mutation step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};
use invoice_dashboard_client::models::{Customer, CustomerField};
use invoice_dashboard_client::queries::is_temp_id;
use invoice_dashboard_client::{
    keys, DashboardQueries, Mutation, MutationOutcome, MutationState,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::{customer_input, dashboard, list, method, names, MockBackend};

/// Test context for optimistic mutation scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct MutationWorld {
    backend: Arc<MockBackend>,
    queries: DashboardQueries,
    held: Option<Arc<Notify>>,
    pending: Option<JoinHandle<MutationOutcome<Customer>>>,
    state: Option<MutationState>,
    writes: Vec<Mutation>,
}

impl MutationWorld {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let queries = dashboard(&backend);
        Self {
            backend,
            queries,
            held: None,
            pending: None,
            state: None,
            writes: Vec::new(),
        }
    }

    async fn cached_customers(&self) -> Vec<CustomerField> {
        self.queries
            .client()
            .get_query_data(&keys::customers())
            .await
            .unwrap()
            .expect("customer list cached")
    }

    /// Settle a create started in the background.
    async fn settle(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.state = Some(handle.await.unwrap().state);
        }
    }
}

// --- Given steps ---

#[given(expr = "a dashboard client with customers {string}")]
async fn given_client_with_customers(world: &mut MutationWorld, names: String) {
    let names = list(&names);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    world.backend.with_customers(&names);
    world.backend.with_invoices(3);
}

#[given("the customer list has been read")]
async fn given_customer_list_read(world: &mut MutationWorld) {
    world.queries.customers().await.unwrap();
}

#[given("the invoices page has been read")]
async fn given_invoices_read(world: &mut MutationWorld) {
    world.queries.invoices("", 1).await.unwrap();
}

#[given(expr = "the server holds the next {word} {word} request")]
async fn given_server_holds(world: &mut MutationWorld, verb: String, noun: String) {
    world.held = Some(world.backend.hold(&method(&format!("{} {}", verb, noun))));
}

#[given(expr = "the server fails {word} {word} {int} time(s) with status {int}")]
async fn given_server_fails(
    world: &mut MutationWorld,
    verb: String,
    noun: String,
    times: usize,
    status: u16,
) {
    world
        .backend
        .fail(&method(&format!("{} {}", verb, noun)), status, times);
}

#[given(expr = "an optimistic write adds {string}")]
async fn given_optimistic_write(world: &mut MutationWorld, name: String) {
    let mutation = world
        .queries
        .client()
        .begin_mutation(&keys::customers(), move |current: Option<Vec<CustomerField>>| {
            let mut customers = current.unwrap_or_default();
            customers.push(CustomerField {
                id: format!("temp-{}", name),
                name,
            });
            customers
        })
        .await
        .unwrap();
    world.writes.push(mutation);
}

// --- When steps ---

#[when(expr = "customer {string} is created")]
async fn when_customer_created(world: &mut MutationWorld, name: String) {
    let queries = world.queries.clone();
    let input = customer_input(&name);
    world.pending = Some(tokio::spawn(async move {
        queries.create_customer(input).await
    }));
    world.backend.wait_for_calls("create_customer", 1).await;
    if world.held.is_none() {
        world.settle().await;
    }
}

#[when(expr = "customer {string} is deleted")]
async fn when_customer_deleted(world: &mut MutationWorld, name: String) {
    let id = world
        .cached_customers()
        .await
        .into_iter()
        .find(|c| c.name == name)
        .expect("customer cached")
        .id;
    let outcome = world.queries.delete_customer(&id).await;
    world.state = Some(outcome.state);
}

#[when("the server releases the held request")]
async fn when_server_releases(world: &mut MutationWorld) {
    world.held.take().expect("no held request").notify_one();
    world.settle().await;
}

#[when("the customer list is read")]
async fn when_customer_list_read(world: &mut MutationWorld) {
    world.queries.customers().await.unwrap();
}

#[when("the first write is rolled back")]
async fn when_first_rolled_back(world: &mut MutationWorld) {
    let first = world.writes.remove(0);
    first.rollback().await;
}

#[when("the second write is rolled back")]
async fn when_second_rolled_back(world: &mut MutationWorld) {
    let second = world.writes.remove(0);
    second.rollback().await;
}

// --- Then steps ---

#[then(expr = "the cached customer names are {string}")]
async fn then_cached_names(world: &mut MutationWorld, expected: String) {
    assert_eq!(names(&world.cached_customers().await), list(&expected));
}

#[then(expr = "{string} has a temporary id")]
async fn then_has_temp_id(world: &mut MutationWorld, name: String) {
    let customers = world.cached_customers().await;
    let customer = customers
        .iter()
        .find(|c| c.name == name)
        .expect("customer cached");
    assert!(is_temp_id(&customer.id), "{} is not temporary", customer.id);
}

#[then("no customer has a temporary id")]
async fn then_no_temp_ids(world: &mut MutationWorld) {
    let customers = world.cached_customers().await;
    assert!(customers.iter().all(|c| !is_temp_id(&c.id)));
}

#[then("the mutation is committed")]
async fn then_committed(world: &mut MutationWorld) {
    assert_eq!(world.state, Some(MutationState::Committed));
}

#[then("the mutation is rolled back")]
async fn then_rolled_back(world: &mut MutationWorld) {
    assert_eq!(world.state, Some(MutationState::RolledBack));
}

#[then("the customer list is stale")]
async fn then_list_stale(world: &mut MutationWorld) {
    let state = world.queries.client().query_state(&keys::customers()).await.unwrap();
    assert!(state.is_stale);
    assert!(!state.pending_mutation);
}

#[then("the customer list is fresh")]
async fn then_list_fresh(world: &mut MutationWorld) {
    let state = world.queries.client().query_state(&keys::customers()).await.unwrap();
    assert!(!state.is_stale);
}

#[then("the invoices page is stale")]
async fn then_invoices_stale(world: &mut MutationWorld) {
    let state = world
        .queries
        .client()
        .query_state(&keys::invoices("", 1))
        .await
        .unwrap();
    assert!(state.is_stale);
}
