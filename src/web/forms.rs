//! POST handlers for HTML forms.
//!
//! Successful actions redirect (303) to their target; validation and
//! database failures re-render the form with the action state.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use http::header::SET_COOKIE;
use http::StatusCode;
use tracing::debug;

use super::pages::{
    render_customer_form, render_invoice_form, render_login, render_profile, render_signup,
};
use super::{ApiError, ApiResult, AppState};
use crate::actions::{paths, ActionError, ActionState, Completed};
use crate::auth::{CurrentUser, MaybeUser};
use crate::models::{Customer, Invoice};
use crate::upload::UploadedFile;
use crate::validation::{CustomerForm, InvoiceForm, LoginForm, ProfileForm, SignupForm};

/// Status for a re-rendered form.
fn rerender_status(err: &ActionError) -> StatusCode {
    match err {
        ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ActionError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Form state to show for `err`, keeping what the user typed.
fn form_state(err: ActionError, values: BTreeMap<String, String>) -> ActionState {
    match err {
        ActionError::Validation(state) => state,
        other => ActionState {
            message: Some(other.message()),
            values,
            ..ActionState::default()
        },
    }
}

/// `<path>?message=<text>`.
fn with_message(path: &str, message: &str) -> String {
    match serde_urlencoded::to_string([("message", message)]) {
        Ok(query) => format!("{}?{}", path, query),
        Err(_) => path.to_string(),
    }
}

// ============================================================================
// Sessions
// ============================================================================

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> ApiResult<Response> {
    let redirect_to = form.redirect_to.clone();
    let email = form.email.clone();

    match state.actions.authenticate(form).await {
        Ok(done) => {
            let cookie = state.sessions.session_cookie(done.value.token);
            let target = done.redirect_to.unwrap_or_else(|| paths::DASHBOARD.to_string());
            Ok(([(SET_COOKIE, cookie.to_string())], Redirect::to(&target)).into_response())
        }
        Err(err) => {
            let status = rerender_status(&err);
            let shown = form_state(err, [("email".to_string(), email)].into());
            let html = render_login(&state, redirect_to.as_deref(), &shown)?;
            Ok((status, html).into_response())
        }
    }
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> ApiResult<Response> {
    let redirect_to = form.redirect_to.clone();
    let values = form.values();

    match state.actions.sign_up(form).await {
        Ok(done) => {
            let cookie = state.sessions.session_cookie(done.value.token);
            let target = done.redirect_to.unwrap_or_else(|| paths::DASHBOARD.to_string());
            Ok(([(SET_COOKIE, cookie.to_string())], Redirect::to(&target)).into_response())
        }
        Err(err) => {
            let status = rerender_status(&err);
            let shown = form_state(err, values);
            let html = render_signup(&state, redirect_to.as_deref(), &shown)?;
            Ok((status, html).into_response())
        }
    }
}

pub async fn logout(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    if let Some(user) = user {
        debug!(user_id = %user.id, "User signed out");
    }
    let cookie = state.sessions.clear_cookie();
    ([(SET_COOKIE, cookie.to_string())], Redirect::to("/")).into_response()
}

// ============================================================================
// Invoices
// ============================================================================

async fn invoice_result(
    state: &AppState,
    user: Option<&CurrentUser>,
    invoice_id: Option<&str>,
    values: BTreeMap<String, String>,
    result: crate::actions::Result<Completed<Invoice>>,
) -> ApiResult<Response> {
    match result {
        Ok(done) => {
            let target = done.redirect_to.unwrap_or_else(|| paths::INVOICES.to_string());
            Ok(Redirect::to(&target).into_response())
        }
        Err(ActionError::NotFound(message)) => Err(ApiError::NotFound(message)),
        Err(err) => {
            let status = rerender_status(&err);
            let shown = form_state(err, values);
            let html = render_invoice_form(state, user, invoice_id, &shown).await?;
            Ok((status, html).into_response())
        }
    }
}

pub async fn create_invoice(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<InvoiceForm>,
) -> ApiResult<Response> {
    let values = form.values();
    let result = state.actions.create_invoice(form).await;
    invoice_result(&state, user.as_ref(), None, values, result).await
}

pub async fn update_invoice(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> ApiResult<Response> {
    let values = form.values();
    let result = state.actions.update_invoice(&id, form).await;
    invoice_result(&state, user.as_ref(), Some(&id), values, result).await
}

pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    let message = match state.actions.delete_invoice(&id).await {
        Ok(done) => done.message.unwrap_or_default(),
        Err(err) => err.message(),
    };
    Redirect::to(&with_message(paths::INVOICES, &message))
}

// ============================================================================
// Customers
// ============================================================================

/// Split a customer multipart body into text fields and the avatar.
async fn read_customer_multipart(
    mut multipart: Multipart,
) -> ApiResult<(CustomerForm, Option<UploadedFile>)> {
    let mut form = CustomerForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            image = Some(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "name" => form.name = text,
            "email" => form.email = text,
            "phone" => form.phone = text,
            "company" => form.company = text,
            "location" => form.location = text,
            "status" => form.status = text,
            _ => {}
        }
    }

    Ok((form, image))
}

async fn customer_result(
    state: &AppState,
    user: Option<&CurrentUser>,
    customer_id: Option<&str>,
    values: BTreeMap<String, String>,
    result: crate::actions::Result<Completed<Customer>>,
) -> ApiResult<Response> {
    match result {
        Ok(done) => {
            let target = done.redirect_to.unwrap_or_else(|| paths::CUSTOMERS.to_string());
            Ok(Redirect::to(&target).into_response())
        }
        Err(ActionError::NotFound(message)) => Err(ApiError::NotFound(message)),
        Err(err) => {
            let status = rerender_status(&err);
            let shown = form_state(err, values);
            let image_url = match customer_id {
                Some(id) => state.storage.customers.get(id).await?.map(|c| c.image_url),
                None => None,
            };
            let html =
                render_customer_form(state, user, customer_id, image_url.as_deref(), &shown)?;
            Ok((status, html).into_response())
        }
    }
}

pub async fn create_customer(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    multipart: Multipart,
) -> ApiResult<Response> {
    let (form, image) = read_customer_multipart(multipart).await?;
    let values = form.values();
    let result = state.actions.create_customer(form, image.as_ref()).await;
    customer_result(&state, user.as_ref(), None, values, result).await
}

pub async fn update_customer(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let (form, image) = read_customer_multipart(multipart).await?;
    let values = form.values();
    let result = state.actions.update_customer(&id, form, image.as_ref()).await;
    customer_result(&state, user.as_ref(), Some(&id), values, result).await
}

pub async fn delete_customer(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    let message = match state.actions.delete_customer(&id).await {
        Ok(done) => done.message.unwrap_or_default(),
        Err(err) => err.message(),
    };
    Redirect::to(&with_message(paths::CUSTOMERS, &message))
}

// ============================================================================
// Profile
// ============================================================================

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> ApiResult<Response> {
    match state.actions.update_profile(&user, form).await {
        Ok(done) => {
            let banner = ActionState {
                message: done.message,
                ..ActionState::default()
            };
            Ok(render_profile(&state, &user, banner).await?.into_response())
        }
        Err(ActionError::NotFound(message)) => Err(ApiError::NotFound(message)),
        Err(err) => {
            let status = rerender_status(&err);
            let shown = form_state(err, Default::default());
            let html = render_profile(&state, &user, shown).await?;
            Ok((status, html).into_response())
        }
    }
}
