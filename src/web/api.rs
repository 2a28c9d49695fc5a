//! JSON API consumed by the client data-sync crate and scripts.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use http::header::SET_COOKIE;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{error, warn};

use super::{ApiError, ApiResult, AppState};
use crate::auth::{CurrentUser, MaybeUser};
use crate::models::{
    CardData, CustomerField, FormattedCustomerRow, InvoiceForm, InvoicePage, InvoiceRow,
    LatestInvoice, Product, ProductStatus, Revenue, UserSummary,
};
use crate::seed::seed_all;
use crate::validation::{self, CustomerForm, LoginForm, ProductForm};

/// Default slice size for infinite scrolling.
const DEFAULT_INFINITE_LIMIT: u64 = 10;
/// Largest slice a client may request.
const MAX_INFINITE_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
    pub page: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InfiniteQuery {
    pub query: String,
    pub cursor: u64,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// `{"message": ...}` for writes without a body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: Option<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.unwrap_or_default(),
    })
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<CurrentUser>,
}

pub async fn session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: CurrentUser,
}

/// Credentials sign-in for API clients. Also sets the session cookie.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> ApiResult<Response> {
    let done = state.actions.authenticate(form).await?;
    let cookie = state.sessions.session_cookie(done.value.token.clone());
    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Json(SignInResponse {
            token: done.value.token,
            user: done.value.user,
        }),
    )
        .into_response())
}

pub async fn sign_out(State(state): State<AppState>) -> Response {
    let cookie = state.sessions.clear_cookie();
    (
        [(SET_COOKIE, cookie.to_string())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub async fn protected(user: CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "message": "This is a protected API route",
        "user": user.email,
        "timestamp": crate::models::now_rfc3339(),
    }))
}

// ============================================================================
// Seed and admin
// ============================================================================

pub async fn seed(State(state): State<AppState>) -> Response {
    match seed_all(&state.storage).await {
        Ok(report) => Json(json!({
            "message": "Database seeded successfully",
            "seeded": report,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Seed failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

pub async fn admin_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let users = state.storage.users.list_summaries().await?;
    Ok(Json(UsersResponse { users }))
}

pub async fn admin_products(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(
        state.storage.products.list(params.category.as_deref()).await?,
    ))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .storage
        .products
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found.".into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let done = state.actions.create_product(form).await?;
    Ok((StatusCode::CREATED, Json(done.value)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.actions.update_product(&id, form).await?.value))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(message(state.actions.delete_product(&id).await?.message))
}

/// Active catalog for signed-in users.
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .storage
        .products
        .list(params.category.as_deref())
        .await?
        .into_iter()
        .filter(|p| p.status == ProductStatus::Active)
        .collect();
    Ok(Json(products))
}

// ============================================================================
// Dashboard
// ============================================================================

pub async fn revenue(State(state): State<AppState>) -> ApiResult<Json<Vec<Revenue>>> {
    Ok(Json(state.storage.dashboard.revenue().await?))
}

pub async fn cards(State(state): State<AppState>) -> ApiResult<Json<CardData>> {
    Ok(Json(state.storage.dashboard.card_totals().await?.into()))
}

pub async fn latest_invoices(State(state): State<AppState>) -> ApiResult<Json<Vec<LatestInvoice>>> {
    Ok(Json(state.storage.dashboard.latest_invoices().await?))
}

// ============================================================================
// Invoices
// ============================================================================

pub async fn invoices(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<Vec<InvoiceRow>>> {
    let page = params.page.unwrap_or(1).max(1);
    Ok(Json(
        state.storage.invoices.filtered(&params.query, page).await?,
    ))
}

pub async fn invoice_pages(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<u64>> {
    Ok(Json(state.storage.invoices.total_pages(&params.query).await?))
}

pub async fn infinite_invoices(
    State(state): State<AppState>,
    Query(params): Query<InfiniteQuery>,
) -> ApiResult<Json<InvoicePage>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_INFINITE_LIMIT)
        .clamp(1, MAX_INFINITE_LIMIT);
    Ok(Json(
        state
            .storage
            .invoices
            .page_after(&params.query, params.cursor, limit)
            .await?,
    ))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InvoiceForm>> {
    state
        .storage
        .invoices
        .get_form(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Invoice not found.".into()))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(form): Json<validation::InvoiceForm>,
) -> ApiResult<(StatusCode, Json<crate::models::Invoice>)> {
    let done = state.actions.create_invoice(form).await?;
    Ok((StatusCode::CREATED, Json(done.value)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<validation::InvoiceForm>,
) -> ApiResult<Json<crate::models::Invoice>> {
    Ok(Json(state.actions.update_invoice(&id, form).await?.value))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(message(state.actions.delete_invoice(&id).await?.message))
}

// ============================================================================
// Customers
// ============================================================================

pub async fn customers(State(state): State<AppState>) -> ApiResult<Json<Vec<CustomerField>>> {
    Ok(Json(state.storage.customers.list_fields().await?))
}

pub async fn filtered_customers(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<Vec<FormattedCustomerRow>>> {
    let rows = state
        .storage
        .customers
        .filtered_table(&params.query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(rows))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<crate::models::Customer>> {
    state
        .storage
        .customers
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Customer not found.".into()))
}

/// JSON customer writes carry no avatar.
pub async fn create_customer(
    State(state): State<AppState>,
    Json(form): Json<CustomerForm>,
) -> ApiResult<(StatusCode, Json<crate::models::Customer>)> {
    let done = state.actions.create_customer(form, None).await?;
    Ok((StatusCode::CREATED, Json(done.value)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<CustomerForm>,
) -> ApiResult<Json<crate::models::Customer>> {
    Ok(Json(state.actions.update_customer(&id, form, None).await?.value))
}

#[derive(Debug, Serialize)]
pub struct DeleteCustomerResponse {
    pub message: String,
    pub removed_invoices: u64,
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteCustomerResponse>> {
    let done = state.actions.delete_customer(&id).await?;
    Ok(Json(DeleteCustomerResponse {
        message: done.message.unwrap_or_default(),
        removed_invoices: done.value,
    }))
}

// ============================================================================
// Revalidation stream
// ============================================================================

/// Server-Sent Events: one `revalidate` event per path bump.
pub async fn revalidate_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.revalidator.subscribe()).filter_map(|item| match item {
        Ok(revalidation) => match Event::default().event("revalidate").json_data(&revalidation) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(error = %e, "Dropping unserializable revalidation event");
                None
            }
        },
        // A slow subscriber missed events; it will catch up on the next bump.
        Err(e) => {
            warn!(error = %e, "Revalidation subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
