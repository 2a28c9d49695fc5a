//! Invoicing and customer-management dashboard.
//!
//! - `storage`: SQL (SQLite/PostgreSQL) and in-memory stores behind the
//!   `interfaces` traits
//! - `actions`: validated writes with path revalidation
//! - `auth`: sessions, password hashing and the route gate
//! - `web`: pages, form posts and the JSON API

pub mod actions;
pub mod auth;
pub mod config;
pub mod interfaces;
pub mod models;
pub mod revalidation;
pub mod seed;
pub mod storage;
pub mod upload;
pub mod utils;
pub mod validation;
pub mod web;
