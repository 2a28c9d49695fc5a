//! axum integration: the gate layer and user extractors.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use http::request::Parts;
use http::StatusCode;
use serde_json::json;
use tracing::debug;

use super::gate::{classify, decide, GateDecision, AUTH_REQUIRED};
use super::CurrentUser;
use crate::web::AppState;

/// Apply the route gate. Allowed requests carry the `CurrentUser` (when
/// signed in) as a request extension.
pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let user = state.sessions.current_user(request.headers());
    let class = classify(&path, state.config.auth.allow_seed);

    match decide(class, user.as_ref(), &path) {
        GateDecision::Allow => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GateDecision::Redirect(location) => {
            debug!(path = %path, location = %location, "Gate redirect");
            Redirect::temporary(&location).into_response()
        }
        GateDecision::Reject { status, message } => {
            debug!(path = %path, status = %status, "Gate rejected request");
            (status, Json(json!({ "error": message }))).into_response()
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": AUTH_REQUIRED })),
            )
                .into_response()
        })
    }
}

/// The signed-in user, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
