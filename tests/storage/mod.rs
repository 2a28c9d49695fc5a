//! Shared storage contract tests.
//!
//! Each function takes a freshly migrated `Storage` bundle and checks one
//! behaviour every backend must agree on. Backend test files invoke the
//! `run_*_tests!` macros with an expression that builds a new bundle, so
//! every test starts from empty tables.

#![allow(dead_code)]

pub mod customer_store_tests;
pub mod dashboard_store_tests;
pub mod invoice_store_tests;
pub mod product_store_tests;
pub mod user_store_tests;

use invoice_dashboard::models::{
    Customer, CustomerStatus, Invoice, InvoiceStatus, NewCustomer, NewInvoice,
};
use invoice_dashboard::storage::Storage;

/// Customer fields with sensible defaults.
pub fn new_customer(name: &str, email: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: email.to_string(),
        image_url: format!("/customers/{}.png", name.to_lowercase().replace(' ', "-")),
        status: CustomerStatus::Active,
        phone: "555-0100".to_string(),
        company: "Acme".to_string(),
        location: "Portland".to_string(),
    }
}

pub fn new_invoice(customer_id: &str, amount: i64, status: InvoiceStatus, date: &str) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount,
        status,
        date: date.to_string(),
    }
}

pub async fn create_customer(storage: &Storage, name: &str, email: &str) -> Customer {
    storage
        .customers
        .create(new_customer(name, email))
        .await
        .expect("create customer")
}

pub async fn create_invoice(
    storage: &Storage,
    customer_id: &str,
    amount: i64,
    status: InvoiceStatus,
    date: &str,
) -> Invoice {
    storage
        .invoices
        .create(new_invoice(customer_id, amount, status, date))
        .await
        .expect("create invoice")
}
