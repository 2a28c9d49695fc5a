//! Domain entities.
//!
//! Rows as they live in the database. Ids are UUIDs stored as text so the
//! same schema works on SQLite and PostgreSQL; dates are `YYYY-MM-DD` text
//! and timestamps RFC 3339 text, both of which sort lexicographically.

mod money;
mod views;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use money::{cents_to_dollars, dollars_to_cents, format_currency, MAX_AMOUNT_CENTS};
pub use views::{
    CardData, CardTotals, CustomerField, CustomerTableRow, FormattedCustomerRow, InvoiceForm,
    InvoicePage, InvoiceRow, LatestInvoice, UserSummary,
};

/// Image used when a customer is created without an avatar.
pub const DEFAULT_CUSTOMER_IMAGE: &str = "/customers/default.png";

/// Error returned when a status/role string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Database/wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// All known values, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Customer account status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

string_enum!(CustomerStatus, "customer status", {
    Active => "active",
    Inactive => "inactive",
});

/// Invoice payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

string_enum!(InvoiceStatus, "invoice status", {
    Pending => "pending",
    Paid => "paid",
});

/// Authorization level carried in the session's role claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

string_enum!(Role, "role", {
    Admin => "admin",
    User => "user",
});

/// Catalog availability of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

string_enum!(ProductStatus, "product status", {
    Active => "active",
    Inactive => "inactive",
});

/// A customer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub status: CustomerStatus,
    pub phone: String,
    pub company: String,
    pub location: String,
}

/// Fields for inserting a customer; the id is generated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub status: CustomerStatus,
    pub phone: String,
    pub company: String,
    pub location: String,
}

/// Fields an update may change. `image_url` is only replaced when a new
/// avatar was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub name: String,
    pub email: String,
    pub status: CustomerStatus,
    pub phone: String,
    pub company: String,
    pub location: String,
    pub image_url: Option<String>,
}

/// An invoice row. `amount` is in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: String,
}

/// Fields for inserting an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: String,
}

/// Fields an invoice update may change. The original date is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceUpdate {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Precomputed monthly revenue aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revenue {
    pub month: String,
    pub revenue: i64,
}

/// A user account. `password` holds the argon2 PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub profile: UserProfile,
}

/// Optional profile details editable from `/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub company: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
}

/// Fields for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// A catalog product. `price` is in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub status: ProductStatus,
}

/// Today's date in the invoice date format.
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Current instant as RFC 3339 text.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fresh UUID v4 as text.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
