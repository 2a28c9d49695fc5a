//! Client data layer for the invoice dashboard.
//!
//! This crate keeps dashboard query results in a keyed cache, refreshes
//! them in the background, applies optimistic writes and follows the
//! server's revalidation stream.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use invoice_dashboard_client::{
//!     DashboardQueries, HttpBackendConfig, HttpDashboardBackend, QueryClient,
//! };
//!
//! async fn example() -> invoice_dashboard_client::Result<()> {
//!     let backend = HttpDashboardBackend::new(HttpBackendConfig::from_env())?;
//!     backend.sign_in("user@nextmail.com", "123456").await?;
//!
//!     let queries = DashboardQueries::new(QueryClient::default(), Arc::new(backend));
//!     let cards = queries.card_data().await?;
//!     let page = queries.invoices("lee", 1).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Mocking for Tests
//!
//! Implement [`DashboardBackend`] to serve canned data:
//!
//! ```rust,ignore
//! use invoice_dashboard_client::{DashboardBackend, Result};
//! use invoice_dashboard_client::models::Revenue;
//! use async_trait::async_trait;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl DashboardBackend for Canned {
//!     async fn revenue(&self) -> Result<Vec<Revenue>> {
//!         Ok(vec![Revenue { month: "Jan".into(), revenue: 2000 }])
//!     }
//!     // ...
//! }
//! ```

pub mod backend;
mod cache;
pub mod client;
pub mod error;
pub mod infinite;
pub mod key;
pub mod keys;
pub mod models;
pub mod mutation;
pub mod policy;
pub mod prefetch;
pub mod queries;
pub mod revalidation;

// Re-export main types at crate root
pub use backend::{DashboardBackend, HttpBackendConfig, HttpDashboardBackend};
pub use cache::QueryState;
pub use client::QueryClient;
pub use error::{ClientError, Result};
pub use infinite::InfiniteInvoices;
pub use key::{KeyPart, QueryKey};
pub use mutation::{Mutation, MutationOutcome, MutationState};
pub use policy::{QueryPolicy, RetryPolicy};
pub use prefetch::PrefetchTarget;
pub use queries::DashboardQueries;
pub use revalidation::{follow_revalidations, SseDecoder};
