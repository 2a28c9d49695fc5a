//! HTTP mapping for handler errors.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::actions::ActionError;
use crate::storage::StorageError;

/// Error returned by JSON handlers and pages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Action(ActionError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Action(ActionError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Action(ActionError::NotFound(_)) | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Action(ActionError::Database(_))
            | ApiError::Storage(_)
            | ApiError::Template(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Action(ActionError::Validation(state)) => json!({
                "error": state.message,
                "errors": state.errors,
                "values": state.values,
            }),
            ApiError::Storage(e) if !e.is_not_found() => {
                error!(error = %e, "Storage error while handling request");
                json!({ "error": "Internal server error" })
            }
            ApiError::Template(e) => {
                error!(error = ?e, "Template rendering failed");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
