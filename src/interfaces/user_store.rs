//! User account storage interface.

use async_trait::async_trait;

use super::Result;
use crate::models::{NewUser, User, UserProfile, UserSummary};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get(&self, id: &str) -> Result<Option<User>>;

    /// Register a user. A duplicate email yields `Conflict`.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Every user without password hashes, ordered by name.
    async fn list_summaries(&self) -> Result<Vec<UserSummary>>;

    /// Replace the display name and profile fields.
    async fn update_profile(&self, id: &str, name: &str, profile: UserProfile) -> Result<User>;

    /// Insert fixture users (already hashed), skipping existing ids.
    async fn seed(&self, users: &[User]) -> Result<()>;
}
