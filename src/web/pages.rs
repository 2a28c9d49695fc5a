//! GET handlers for the server-rendered pages.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

use super::templates::{field_views, PageContext};
use super::{ApiError, ApiResult, AppState};
use crate::actions::ActionState;
use crate::auth::gate::safe_redirect_target;
use crate::auth::{CurrentUser, MaybeUser};
use crate::models::{CardData, FormattedCustomerRow, Revenue, Role, User};

/// Inputs of the customer form other than status and avatar.
pub(super) const CUSTOMER_FIELDS: [(&str, &str, &str); 5] = [
    ("name", "Name", "text"),
    ("email", "Email", "email"),
    ("phone", "Phone", "tel"),
    ("company", "Company", "text"),
    ("location", "Location", "text"),
];

pub(super) const PROFILE_FIELDS: [(&str, &str, &str); 5] = [
    ("name", "Name", "text"),
    ("title", "Title", "text"),
    ("company", "Company", "text"),
    ("location", "Location", "text"),
    ("phone", "Phone", "tel"),
];

/// `?query=&page=&message=` on list pages.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub query: String,
    pub page: Option<String>,
    pub message: Option<String>,
}

impl ListParams {
    /// Requested page; anything unparseable or below 1 is page 1.
    fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

/// `?redirectTo=&error=` on the sign-in pages.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthParams {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
    pub error: Option<String>,
}

fn render(state: &AppState, name: &str, page: &PageContext) -> ApiResult<Html<String>> {
    Ok(Html(state.templates.render(name, page)?))
}

pub async fn home(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> ApiResult<Html<String>> {
    render(&state, "home.html", &PageContext::new("/", user.as_ref()))
}

// ============================================================================
// Sign-in
// ============================================================================

pub(super) fn render_login(
    state: &AppState,
    redirect_to: Option<&str>,
    form: &ActionState,
) -> ApiResult<Html<String>> {
    let page = PageContext::new("/login", None)
        .with("redirect_to", &safe_redirect_target(redirect_to))
        .with("message", &form.message)
        .with("values", &form.values)
        .with("errors", &form.errors);
    render(state, "login.html", &page)
}

pub(super) fn render_signup(
    state: &AppState,
    redirect_to: Option<&str>,
    form: &ActionState,
) -> ApiResult<Html<String>> {
    let page = PageContext::new("/signup", None)
        .with("redirect_to", &safe_redirect_target(redirect_to))
        .with("message", &form.message)
        .with("values", &form.values)
        .with("errors", &form.errors);
    render(state, "signup.html", &page)
}

fn error_state(error: Option<String>) -> ActionState {
    ActionState {
        message: error,
        ..ActionState::default()
    }
}

pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<AuthParams>,
) -> ApiResult<Html<String>> {
    render_login(&state, params.redirect_to.as_deref(), &error_state(params.error))
}

pub async fn signup(
    State(state): State<AppState>,
    Query(params): Query<AuthParams>,
) -> ApiResult<Html<String>> {
    render_signup(&state, params.redirect_to.as_deref(), &error_state(params.error))
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Serialize)]
struct RevenueBar {
    month: String,
    revenue: i64,
    height: i64,
}

/// Chart scale rounded up to the next thousand, plus bar heights as
/// percentages of it.
fn revenue_chart(revenue: &[Revenue]) -> (i64, Vec<RevenueBar>) {
    let highest = revenue.iter().map(|r| r.revenue).max().unwrap_or(0);
    let top = ((highest + 999) / 1000).max(1) * 1000;
    let bars = revenue
        .iter()
        .map(|r| RevenueBar {
            month: r.month.clone(),
            revenue: r.revenue,
            height: r.revenue.max(0) * 100 / top,
        })
        .collect();
    (top, bars)
}

pub async fn dashboard(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Html<String>> {
    let (revenue, latest, totals) = tokio::try_join!(
        state.storage.dashboard.revenue(),
        state.storage.dashboard.latest_invoices(),
        state.storage.dashboard.card_totals(),
    )?;
    let (top, bars) = revenue_chart(&revenue);

    let page = PageContext::new("/dashboard", user.as_ref())
        .with("cards", &CardData::from(totals))
        .with("bars", &bars)
        .with("top_label", &top)
        .with("latest_invoices", &latest);
    render(&state, "dashboard.html", &page)
}

// ============================================================================
// Invoices
// ============================================================================

pub async fn invoices(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Html<String>> {
    let current_page = params.page();
    let (rows, total_pages) = tokio::try_join!(
        state.storage.invoices.filtered(&params.query, current_page),
        state.storage.invoices.total_pages(&params.query),
    )?;
    let pages: Vec<u64> = (1..=total_pages).collect();

    let page = PageContext::new("/dashboard/invoices", user.as_ref())
        .with("query", &params.query)
        .with("invoices", &rows)
        .with("current_page", &current_page)
        .with("total_pages", &total_pages)
        .with("pages", &pages)
        .with("message", &params.message);
    render(&state, "invoices.html", &page)
}

/// Create or edit form for an invoice.
pub(super) async fn render_invoice_form(
    state: &AppState,
    user: Option<&CurrentUser>,
    invoice_id: Option<&str>,
    form: &ActionState,
) -> ApiResult<Html<String>> {
    let customers = state.storage.customers.list_fields().await?;
    let (path, heading, submit) = match invoice_id {
        Some(id) => (
            format!("/dashboard/invoices/{}/edit", id),
            "Edit Invoice",
            "Edit Invoice",
        ),
        None => (
            "/dashboard/invoices/create".to_string(),
            "Create Invoice",
            "Create Invoice",
        ),
    };

    let page = PageContext::new(&path, user)
        .with("action", &path)
        .with("heading", heading)
        .with("submit_label", submit)
        .with("customers", &customers)
        .with("values", &form.values)
        .with("errors", &form.errors)
        .with("message", &form.message);
    render(state, "invoice_form.html", &page)
}

pub async fn create_invoice(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Html<String>> {
    render_invoice_form(&state, user.as_ref(), None, &ActionState::default()).await
}

pub async fn edit_invoice(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let invoice = state
        .storage
        .invoices
        .get_form(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invoice not found.".into()))?;

    let form = ActionState {
        values: [
            ("customer_id".to_string(), invoice.customer_id),
            ("amount".to_string(), invoice.amount.to_string()),
            ("status".to_string(), invoice.status.to_string()),
        ]
        .into(),
        ..ActionState::default()
    };
    render_invoice_form(&state, user.as_ref(), Some(&id), &form).await
}

// ============================================================================
// Customers
// ============================================================================

pub async fn customers(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Html<String>> {
    let rows: Vec<FormattedCustomerRow> = state
        .storage
        .customers
        .filtered_table(&params.query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let page = PageContext::new("/dashboard/customers", user.as_ref())
        .with("query", &params.query)
        .with("customers", &rows)
        .with("message", &params.message);
    render(&state, "customers.html", &page)
}

pub(super) fn render_customer_form(
    state: &AppState,
    user: Option<&CurrentUser>,
    customer_id: Option<&str>,
    image_url: Option<&str>,
    form: &ActionState,
) -> ApiResult<Html<String>> {
    let (path, heading, submit) = match customer_id {
        Some(id) => (
            format!("/dashboard/customers/{}/edit", id),
            "Edit Customer",
            "Update Customer",
        ),
        None => (
            "/dashboard/customers/create".to_string(),
            "Create Customer",
            "Create Customer",
        ),
    };

    let page = PageContext::new(&path, user)
        .with("action", &path)
        .with("heading", heading)
        .with("submit_label", submit)
        .with("fields", &field_views(&CUSTOMER_FIELDS, &form.values, &form.errors))
        .with("values", &form.values)
        .with("errors", &form.errors)
        .with("image_url", &image_url)
        .with("message", &form.message);
    render(state, "customer_form.html", &page)
}

pub async fn create_customer(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Html<String>> {
    render_customer_form(&state, user.as_ref(), None, None, &ActionState::default())
}

pub async fn edit_customer(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let customer = state
        .storage
        .customers
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found.".into()))?;

    let form = ActionState {
        values: [
            ("name", customer.name),
            ("email", customer.email),
            ("phone", customer.phone),
            ("company", customer.company),
            ("location", customer.location),
            ("status", customer.status.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        ..ActionState::default()
    };
    render_customer_form(
        &state,
        user.as_ref(),
        Some(&id),
        Some(&customer.image_url),
        &form,
    )
}

// ============================================================================
// Admin and profile
// ============================================================================

pub async fn admin(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Html<String>> {
    let (users, products) = tokio::try_join!(
        state.storage.users.list_summaries(),
        state.storage.products.list(None),
    )?;

    let page = PageContext::new("/admin", user.as_ref())
        .with("users", &users)
        .with("products", &products);
    render(&state, "admin.html", &page)
}

fn stored_values(user: &User) -> BTreeMap<String, String> {
    [
        ("name", Some(user.name.clone())),
        ("title", user.profile.title.clone()),
        ("company", user.profile.company.clone()),
        ("location", user.profile.location.clone()),
        ("phone", user.profile.phone.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.unwrap_or_default()))
    .collect()
}

#[derive(Debug, Serialize)]
struct ProfileHeader {
    email: String,
    role: Role,
}

/// Profile page. An outcome without values shows the stored profile under
/// its banner.
pub(super) async fn render_profile(
    state: &AppState,
    user: &CurrentUser,
    outcome: ActionState,
) -> ApiResult<Html<String>> {
    let stored = state
        .storage
        .users
        .get(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;

    let shown = if outcome.values.is_empty() {
        ActionState {
            values: stored_values(&stored),
            ..outcome
        }
    } else {
        outcome
    };

    let page = PageContext::new("/profile", Some(user))
        .with(
            "profile",
            &ProfileHeader {
                email: stored.email,
                role: stored.role,
            },
        )
        .with("fields", &field_views(&PROFILE_FIELDS, &shown.values, &shown.errors))
        .with("failed", &shown.has_errors())
        .with("message", &shown.message);
    render(state, "profile.html", &page)
}

pub async fn profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Html<String>> {
    render_profile(&state, &user, ActionState::default()).await
}
