//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! Table DDL lives in `migrations/`.

use sea_query::Iden;

/// Customers table schema.
#[derive(Iden, Clone, Copy)]
pub enum Customers {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "email"]
    Email,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "status"]
    Status,
    #[iden = "phone"]
    Phone,
    #[iden = "company"]
    Company,
    #[iden = "location"]
    Location,
}

/// Invoices table schema.
#[derive(Iden, Clone, Copy)]
pub enum Invoices {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "customer_id"]
    CustomerId,
    #[iden = "amount"]
    Amount,
    #[iden = "status"]
    Status,
    #[iden = "date"]
    Date,
}

/// Revenue table schema.
#[derive(Iden, Clone, Copy)]
pub enum Revenue {
    Table,
    #[iden = "month"]
    Month,
    #[iden = "revenue"]
    Revenue,
}

/// Users table schema.
#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "email"]
    Email,
    #[iden = "password"]
    Password,
    #[iden = "role"]
    Role,
    #[iden = "company"]
    Company,
    #[iden = "location"]
    Location,
    #[iden = "phone"]
    Phone,
    #[iden = "title"]
    Title,
}

/// Products table schema.
#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
    #[iden = "price"]
    Price,
    #[iden = "category"]
    Category,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
