//! Credential sign-in and registration.

use tracing::{info, warn};
use validator::Validate;

use super::{messages, ActionError, ActionState, Actions, Completed, Result};
use crate::auth::gate::safe_redirect_target;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::CurrentUser;
use crate::models::{NewUser, Role, User};
use crate::storage::StorageError;
use crate::validation::{field_errors, LoginForm, SignupForm};

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub token: String,
    pub user: CurrentUser,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn went_wrong(err: impl std::fmt::Display) -> ActionError {
    tracing::error!(error = %err, "Authentication failed unexpectedly");
    ActionError::Database(messages::SOMETHING_WENT_WRONG.to_string())
}

impl Actions {
    fn sign_in(&self, user: &User) -> Result<SignedIn> {
        let token = self.sessions.issue(user).map_err(went_wrong)?;
        Ok(SignedIn {
            token,
            user: CurrentUser {
                id: user.id.clone(),
                email: user.email.clone(),
                name: user.name.clone(),
                role: user.role,
            },
        })
    }

    /// Check credentials and issue a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, form: LoginForm) -> Result<Completed<SignedIn>> {
        if form.validate().is_err() {
            return Err(ActionError::Unauthorized(
                messages::INVALID_CREDENTIALS.to_string(),
            ));
        }

        let email = normalize_email(&form.email);
        let user = self
            .storage
            .users
            .find_by_email(&email)
            .await
            .map_err(went_wrong)?;

        let Some(user) = user else {
            warn!(email = %email, "Sign-in for unknown email");
            return Err(ActionError::Unauthorized(
                messages::INVALID_CREDENTIALS.to_string(),
            ));
        };

        let password = form.password.clone();
        let hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(went_wrong)?;
        if !matches {
            warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(ActionError::Unauthorized(
                messages::INVALID_CREDENTIALS.to_string(),
            ));
        }

        let session = self.sign_in(&user)?;
        info!(user_id = %user.id, role = %user.role, "User signed in");
        let target = safe_redirect_target(form.redirect_to.as_deref());
        Ok(Completed::redirect(session, &target))
    }

    /// Register a `user`-role account and sign it in.
    pub async fn sign_up(&self, form: SignupForm) -> Result<Completed<SignedIn>> {
        let form = form.trimmed();
        form.validate_all().map_err(|errors| {
            ActionError::Validation(ActionState::invalid(
                errors,
                messages::SIGNUP_MISSING,
                form.values(),
            ))
        })?;

        let password = form.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(went_wrong)?
            .map_err(went_wrong)?;

        let user = self
            .storage
            .users
            .create(NewUser {
                name: form.name.clone(),
                email: normalize_email(&form.email),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                StorageError::Conflict(_) => ActionError::Validation(ActionState::invalid(
                    [("email".to_string(), vec![messages::EMAIL_TAKEN.to_string()])].into(),
                    messages::SIGNUP_MISSING,
                    form.values(),
                )),
                other => went_wrong(other),
            })?;

        let session = self.sign_in(&user)?;
        info!(user_id = %user.id, "User registered");
        let target = safe_redirect_target(form.redirect_to.as_deref());
        Ok(Completed::redirect(session, &target))
    }
}
