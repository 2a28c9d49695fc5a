//! In-memory store contract tests.
//!
//! The mock backs the action and HTTP tests, so it must agree with the SQL
//! backends on ordering, search and paging.

mod storage;

use std::sync::Arc;

use invoice_dashboard::storage::{MockStore, Storage};

fn fresh() -> Storage {
    Storage::mock(Arc::new(MockStore::new()))
}

#[tokio::test]
async fn test_mock_customer_store() {
    run_customer_store_tests!(fresh());
}

#[tokio::test]
async fn test_mock_invoice_store() {
    run_invoice_store_tests!(fresh());
}

#[tokio::test]
async fn test_mock_dashboard_store() {
    run_dashboard_store_tests!(fresh());
}

#[tokio::test]
async fn test_mock_user_store() {
    run_user_store_tests!(fresh());
}

#[tokio::test]
async fn test_mock_product_store() {
    run_product_store_tests!(fresh());
}
