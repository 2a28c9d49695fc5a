//! Profile edits by the signed-in user.

use tracing::info;
use validator::Validate;

use super::{messages, paths, ActionError, ActionState, Actions, Completed, Result};
use crate::auth::CurrentUser;
use crate::models::User;
use crate::validation::{field_errors, ProfileForm};

impl Actions {
    /// Update the caller's name and profile fields. The role is never
    /// taken from the form.
    pub async fn update_profile(
        &self,
        user: &CurrentUser,
        form: ProfileForm,
    ) -> Result<Completed<User>> {
        let form = form.trimmed();
        form.validate().map_err(|e| {
            let values = [
                ("name", Some(form.name.clone())),
                ("company", form.company.clone()),
                ("location", form.location.clone()),
                ("phone", form.phone.clone()),
                ("title", form.title.clone()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.unwrap_or_default()))
            .collect();
            ActionError::Validation(ActionState::invalid(
                field_errors(&e),
                messages::PROFILE_MISSING,
                values,
            ))
        })?;

        let updated = self
            .storage
            .users
            .update_profile(&user.id, &form.name, form.profile())
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => ActionError::NotFound(messages::PROFILE_FAILED.to_string()),
                other => ActionError::database(other, messages::PROFILE_FAILED),
            })?;

        info!(user_id = %user.id, "Profile updated");
        self.revalidator.revalidate(paths::PROFILE).await;
        Ok(Completed::message(updated, messages::PROFILE_UPDATED))
    }
}
