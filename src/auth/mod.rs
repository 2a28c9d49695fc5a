//! Authentication and route gating.
//!
//! - `password`: argon2id hashing and verification
//! - `session`: HS256 session tokens carried in a cookie or bearer header
//! - `gate`: pure route classification and allow/redirect/reject decisions
//! - `middleware`: axum layer applying the gate to every request

pub mod gate;
pub mod middleware;
pub mod password;
pub mod session;

use serde::{Deserialize, Serialize};

use crate::models::Role;

pub use gate::{classify, decide, GateDecision, RouteClass};
pub use middleware::{auth_gate, MaybeUser};
pub use session::{Claims, SessionManager};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while authenticating.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Authentication required")]
    MissingSession,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Admin access required")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// The user a request is acting as, taken from verified session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
