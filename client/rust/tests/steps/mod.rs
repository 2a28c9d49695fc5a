//! Step definition modules for Cucumber feature tests.

pub mod cache;
pub mod infinite;
pub mod mutations;
pub mod prefetch;
pub mod revalidation;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use invoice_dashboard_client::models::{
    CardData, Customer, CustomerField, CustomerInput, CustomerRow, Invoice, InvoiceForm,
    InvoiceInput, InvoicePage, InvoiceRow, LatestInvoice, Revenue,
};
use invoice_dashboard_client::{
    ClientError, DashboardBackend, DashboardQueries, QueryClient, Result, RetryPolicy,
};
use tokio::sync::Notify;

/// Retry schedule fast enough for tests.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

/// Backend method name as used in step text.
pub fn method(name: &str) -> String {
    name.trim().replace(' ', "_")
}

#[derive(Debug, Default)]
struct MockState {
    calls: HashMap<String, usize>,
    failures: HashMap<String, VecDeque<ClientError>>,
    holds: HashMap<String, Arc<Notify>>,
    customers: Vec<CustomerField>,
    invoices: Vec<InvoiceRow>,
    next_id: usize,
}

/// In-memory backend that counts calls and can fail or stall them.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(&self, names: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for name in names {
            state.next_id += 1;
            let id = format!("cust-{}", state.next_id);
            state.customers.push(CustomerField {
                id,
                name: name.to_string(),
            });
        }
        state.customers.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn with_invoices(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        state.invoices = (0..count)
            .map(|i| InvoiceRow {
                id: format!("inv-{}", i),
                customer_id: "cust-1".to_string(),
                name: "Lee Robinson".to_string(),
                email: "lee@robinson.com".to_string(),
                image_url: "/customers/lee-robinson.png".to_string(),
                amount: 1000 + i as i64,
                date: format!("2024-01-{:02}", i % 28 + 1),
                status: "pending".to_string(),
            })
            .collect();
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    /// Fail the next `times` calls of `method` with `status`.
    pub fn fail(&self, method: &str, status: u16, times: usize) {
        let mut state = self.state.lock().unwrap();
        let queue = state.failures.entry(method.to_string()).or_default();
        for _ in 0..times {
            queue.push_back(ClientError::Http {
                status,
                message: format!("status {}", status),
            });
        }
    }

    /// Stall the next call of `method` until the returned handle is notified.
    pub fn hold(&self, method: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .holds
            .insert(method.to_string(), gate.clone());
        gate
    }

    /// Poll until `method` has been called at least `count` times.
    pub async fn wait_for_calls(&self, method: &str, count: usize) {
        for _ in 0..1000 {
            if self.calls(method) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("{} was never called {} times", method, count);
    }

    async fn enter(&self, method: &str) -> Result<usize> {
        let (call, hold) = {
            let mut state = self.state.lock().unwrap();
            let calls = state.calls.entry(method.to_string()).or_default();
            *calls += 1;
            let call = *calls;
            (call, state.holds.remove(method))
        };
        if let Some(gate) = hold {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        match state.failures.get_mut(method).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(call),
        }
    }
}

#[async_trait]
impl DashboardBackend for MockBackend {
    async fn revenue(&self) -> Result<Vec<Revenue>> {
        let call = self.enter("revenue").await?;
        Ok(vec![Revenue {
            month: "Jan".to_string(),
            revenue: call as i64 * 100,
        }])
    }

    async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        self.enter("latest_invoices").await?;
        Ok(Vec::new())
    }

    async fn card_data(&self) -> Result<CardData> {
        self.enter("card_data").await?;
        let state = self.state.lock().unwrap();
        Ok(CardData {
            number_of_customers: state.customers.len() as i64,
            number_of_invoices: state.invoices.len() as i64,
            total_paid_invoices: "$0.00".to_string(),
            total_pending_invoices: "$0.00".to_string(),
        })
    }

    async fn invoices(&self, _query: &str, page: u64) -> Result<Vec<InvoiceRow>> {
        self.enter("invoices").await?;
        let state = self.state.lock().unwrap();
        let start = (page.max(1) as usize - 1) * 6;
        Ok(state.invoices.iter().skip(start).take(6).cloned().collect())
    }

    async fn invoices_pages(&self, _query: &str) -> Result<u64> {
        self.enter("invoices_pages").await?;
        let state = self.state.lock().unwrap();
        Ok(state.invoices.len().div_ceil(6) as u64)
    }

    async fn invoice_page(&self, _query: &str, cursor: u64, limit: u64) -> Result<InvoicePage> {
        self.enter("invoice_page").await?;
        let state = self.state.lock().unwrap();
        let start = cursor as usize;
        let end = (start + limit as usize).min(state.invoices.len());
        let data = state.invoices.get(start..end).unwrap_or_default().to_vec();
        let next_cursor = (end < state.invoices.len()).then_some(end as u64);
        Ok(InvoicePage { data, next_cursor })
    }

    async fn invoice(&self, id: &str) -> Result<InvoiceForm> {
        self.enter("invoice").await?;
        let state = self.state.lock().unwrap();
        state
            .invoices
            .iter()
            .find(|row| row.id == id)
            .map(|row| InvoiceForm {
                id: row.id.clone(),
                customer_id: row.customer_id.clone(),
                amount: row.amount as f64 / 100.0,
                status: row.status.clone(),
            })
            .ok_or(ClientError::Http {
                status: 404,
                message: "Invoice not found".to_string(),
            })
    }

    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice> {
        self.enter("create_invoice").await?;
        Ok(Invoice {
            id: "inv-new".to_string(),
            customer_id: input.customer_id.clone(),
            amount: (input.amount * 100.0).round() as i64,
            status: input.status.clone(),
            date: "2024-06-01".to_string(),
        })
    }

    async fn delete_invoice(&self, id: &str) -> Result<()> {
        self.enter("delete_invoice").await?;
        self.state.lock().unwrap().invoices.retain(|row| row.id != id);
        Ok(())
    }

    async fn customers(&self) -> Result<Vec<CustomerField>> {
        self.enter("customers").await?;
        Ok(self.state.lock().unwrap().customers.clone())
    }

    async fn filtered_customers(&self, query: &str) -> Result<Vec<CustomerRow>> {
        self.enter("filtered_customers").await?;
        let state = self.state.lock().unwrap();
        let needle = query.to_lowercase();
        Ok(state
            .customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .map(|c| CustomerRow {
                id: c.id.clone(),
                name: c.name.clone(),
                email: String::new(),
                image_url: String::new(),
                total_invoices: 0,
                total_pending: "$0.00".to_string(),
                total_paid: "$0.00".to_string(),
            })
            .collect())
    }

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer> {
        self.enter("create_customer").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("cust-{}", state.next_id);
        state.customers.push(CustomerField {
            id: id.clone(),
            name: input.name.clone(),
        });
        state.customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Customer {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            image_url: "/customers/placeholder.png".to_string(),
            status: input.status.clone(),
            phone: input.phone.clone(),
            company: input.company.clone(),
            location: input.location.clone(),
        })
    }

    async fn delete_customer(&self, id: &str) -> Result<u64> {
        self.enter("delete_customer").await?;
        let mut state = self.state.lock().unwrap();
        state.customers.retain(|c| c.id != id);
        let before = state.invoices.len();
        state.invoices.retain(|row| row.customer_id != id);
        Ok((before - state.invoices.len()) as u64)
    }
}

/// Queries wired to a fresh mock backend.
pub fn dashboard(backend: &Arc<MockBackend>) -> DashboardQueries {
    DashboardQueries::new(QueryClient::new(fast_retry()), backend.clone())
}

pub fn customer_input(name: &str) -> CustomerInput {
    CustomerInput {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-555-0100".to_string(),
        company: "Acme".to_string(),
        location: "Portland".to_string(),
        status: "active".to_string(),
    }
}

/// Names in a cached customer list.
pub fn names(customers: &[CustomerField]) -> Vec<String> {
    customers.iter().map(|c| c.name.clone()).collect()
}

/// Parse `"a, b, c"` into parts.
pub fn list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
