//! Dashboard API access.
//!
//! [`DashboardBackend`] is the seam the query layer fetches through.
//! [`HttpDashboardBackend`] talks to the server's JSON API with bearer
//! authentication; tests substitute in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::models::{
    CardData, Customer, CustomerField, CustomerInput, CustomerRow, DeletedCustomer, Invoice,
    InvoiceForm, InvoiceInput, InvoicePage, InvoiceRow, LatestInvoice, Revalidation, Revenue,
    SignIn,
};
use crate::revalidation::SseDecoder;

/// Revalidation streams stay open far longer than ordinary requests.
const STREAM_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Data source for every dashboard query and mutation.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn revenue(&self) -> Result<Vec<Revenue>>;

    async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>>;

    async fn card_data(&self) -> Result<CardData>;

    /// One page of the invoices table matching `query`. Pages start at 1.
    async fn invoices(&self, query: &str, page: u64) -> Result<Vec<InvoiceRow>>;

    async fn invoices_pages(&self, query: &str) -> Result<u64>;

    /// Cursor page of the infinite invoice list.
    async fn invoice_page(&self, query: &str, cursor: u64, limit: u64) -> Result<InvoicePage>;

    async fn invoice(&self, id: &str) -> Result<InvoiceForm>;

    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice>;

    async fn delete_invoice(&self, id: &str) -> Result<()>;

    async fn customers(&self) -> Result<Vec<CustomerField>>;

    async fn filtered_customers(&self, query: &str) -> Result<Vec<CustomerRow>>;

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer>;

    /// Returns how many invoices were removed with the customer.
    async fn delete_customer(&self, id: &str) -> Result<u64>;
}

/// HTTP backend configuration.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Server origin, e.g. `http://localhost:3000`.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Bearer token from a previous sign-in.
    pub token: Option<String>,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl HttpBackendConfig {
    /// Create config from environment variables.
    ///
    /// - `DASHBOARD_URL`: server origin (default: `http://localhost:3000`)
    /// - `DASHBOARD_TIMEOUT`: timeout in seconds (default: 30)
    /// - `DASHBOARD_TOKEN`: optional bearer token
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("DASHBOARD_URL").unwrap_or(defaults.base_url);
        let timeout = std::env::var("DASHBOARD_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let token = std::env::var("DASHBOARD_TOKEN").ok().filter(|t| !t.is_empty());

        Self {
            base_url,
            timeout,
            token,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// [`DashboardBackend`] over the server's JSON API.
pub struct HttpDashboardBackend {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpDashboardBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::InvalidArgument(
                "base url not configured".to_string(),
            ));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(config.token),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(HttpBackendConfig::from_env())
    }

    /// Sign in with credentials and use the returned token from now on.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn> {
        let body = serde_json::json!({ "email": email, "password": password });
        let signed_in: SignIn = self.send_json(Method::POST, "/api/auth/session", &body).await?;
        *self.token.write().await = Some(signed_in.token.clone());
        debug!(email = %email, "Signed in");
        Ok(signed_in)
    }

    pub async fn sign_out(&self) {
        *self.token.write().await = None;
    }

    /// Subscribe to server revalidation notices.
    pub async fn revalidations(&self) -> Result<BoxStream<'static, Result<Revalidation>>> {
        let response = self
            .request(Method::GET, "/api/revalidate")
            .await
            .header("Accept", "text/event-stream")
            .timeout(STREAM_TIMEOUT)
            .send()
            .await?;
        let response = check(response).await?;

        let mut decoder = SseDecoder::default();
        let notices = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => decoder.push(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(ClientError::from(e))],
            })
            .flat_map(stream::iter);
        Ok(notices.boxed())
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.request(Method::GET, path).await.query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path).await.json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        let response = self.request(Method::DELETE, path).await.send().await?;
        check(response).await
    }
}

/// Map non-success answers to [`ClientError::Http`], preferring the
/// server's `error` field as the message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect());
    if status.is_server_error() {
        warn!(status = %status, message = %message, "Server error");
    } else {
        debug!(status = %status, message = %message, "Request rejected");
    }
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DashboardBackend for HttpDashboardBackend {
    async fn revenue(&self) -> Result<Vec<Revenue>> {
        self.get_json("/api/dashboard/revenue", &[]).await
    }

    async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        self.get_json("/api/invoices/latest", &[]).await
    }

    async fn card_data(&self) -> Result<CardData> {
        self.get_json("/api/dashboard/cards", &[]).await
    }

    async fn invoices(&self, query: &str, page: u64) -> Result<Vec<InvoiceRow>> {
        self.get_json(
            "/api/invoices",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn invoices_pages(&self, query: &str) -> Result<u64> {
        self.get_json("/api/invoices/pages", &[("query", query.to_string())])
            .await
    }

    async fn invoice_page(&self, query: &str, cursor: u64, limit: u64) -> Result<InvoicePage> {
        self.get_json(
            "/api/invoices/infinite",
            &[
                ("query", query.to_string()),
                ("cursor", cursor.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn invoice(&self, id: &str) -> Result<InvoiceForm> {
        self.get_json(&format!("/api/invoices/{}", id), &[]).await
    }

    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice> {
        self.send_json(Method::POST, "/api/invoices", input).await
    }

    async fn delete_invoice(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/invoices/{}", id)).await?;
        Ok(())
    }

    async fn customers(&self) -> Result<Vec<CustomerField>> {
        self.get_json("/api/customers", &[]).await
    }

    async fn filtered_customers(&self, query: &str) -> Result<Vec<CustomerRow>> {
        self.get_json("/api/customers/filtered", &[("query", query.to_string())])
            .await
    }

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer> {
        self.send_json(Method::POST, "/api/customers", input).await
    }

    async fn delete_customer(&self, id: &str) -> Result<u64> {
        let response = self.delete(&format!("/api/customers/{}", id)).await?;
        let deleted: DeletedCustomer = response.json().await?;
        Ok(deleted.removed_invoices)
    }
}
