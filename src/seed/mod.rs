//! Placeholder data for development databases.
//!
//! Rows carry fixed ids so seeding twice is a no-op. Both accounts use the
//! password `123456`.

mod data;

use serde::Serialize;
use tracing::info;

use crate::auth::password::hash_password;
use crate::auth::AuthError;
use crate::models::{now_rfc3339, Role, User, UserProfile};
use crate::storage::{Storage, StorageError};

pub use data::{customers, invoices, products, revenue};

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "123456";

/// Result type for seeding.
pub type Result<T> = std::result::Result<T, SeedError>;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Row counts offered to the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub customers: usize,
    pub invoices: usize,
    pub revenue: usize,
    pub users: usize,
    pub products: usize,
}

/// The two fixture accounts with freshly hashed passwords.
pub async fn users() -> Result<Vec<User>> {
    let hash = tokio::task::spawn_blocking(|| hash_password(SEED_PASSWORD)).await??;
    let account = |id: &str, name: &str, email: &str, role: Role| User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: hash.clone(),
        role,
        profile: UserProfile::default(),
    };
    Ok(vec![
        account(
            "410544b2-4001-4271-9855-fec4b6a6442a",
            "User",
            "user@nextmail.com",
            Role::User,
        ),
        account(
            "8f2c7a1e-5b0d-4c3e-9a6f-2d1e0b9c8a7f",
            "Admin",
            "admin@nextmail.com",
            Role::Admin,
        ),
    ])
}

/// Insert every fixture table. Existing rows are left alone.
pub async fn seed_all(storage: &Storage) -> Result<SeedReport> {
    let customers = customers();
    storage.customers.seed(&customers).await?;

    let invoices = invoices();
    storage.invoices.seed(&invoices).await?;

    let revenue = revenue();
    storage.dashboard.seed_revenue(&revenue).await?;

    // Accounts registered by hand keep their email.
    let mut users = Vec::new();
    for user in self::users().await? {
        if storage.users.find_by_email(&user.email).await?.is_none() {
            users.push(user);
        }
    }
    storage.users.seed(&users).await?;

    let mut product_count = 0;
    if storage.products.list(None).await?.is_empty() {
        for product in products() {
            storage.products.create(product).await?;
            product_count += 1;
        }
    }

    let report = SeedReport {
        customers: customers.len(),
        invoices: invoices.len(),
        revenue: revenue.len(),
        users: users.len(),
        products: product_count,
    };
    info!(
        customers = report.customers,
        invoices = report.invoices,
        revenue = report.revenue,
        users = report.users,
        products = report.products,
        seeded_at = %now_rfc3339(),
        "Database seeded"
    );
    Ok(report)
}
