//! In-memory storage implementation for testing.
//!
//! `MockStore` implements every store trait over one set of shared tables so
//! cross-table rules (invoice foreign key, customer cascade, unique email)
//! behave the way the SQL backends do.

use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::helpers::{checked_total, matches_ci, page_offset, split_page, total_pages};
use crate::interfaces::{
    CustomerStore, DashboardStore, InvoiceStore, ProductStore, Result, StorageError, UserStore,
    ITEMS_PER_PAGE,
};
use crate::models::{
    format_currency, new_id, now_rfc3339, CardTotals, Customer, CustomerField, CustomerTableRow,
    CustomerUpdate, Invoice, InvoiceForm, InvoicePage, InvoiceRow, InvoiceStatus, InvoiceUpdate,
    LatestInvoice, NewCustomer, NewInvoice, NewUser, Product, ProductInput, Revenue, User,
    UserProfile, UserSummary,
};

#[derive(Default)]
struct Tables {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    revenue: Vec<Revenue>,
    users: Vec<User>,
    products: Vec<Product>,
}

impl Tables {
    fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn invoice_rows(&self, query: &str) -> Vec<InvoiceRow> {
        let mut rows: Vec<InvoiceRow> = self
            .invoices
            .iter()
            .filter_map(|inv| {
                let customer = self.customer(&inv.customer_id)?;
                Some(InvoiceRow {
                    id: inv.id.clone(),
                    customer_id: inv.customer_id.clone(),
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    amount: inv.amount,
                    date: inv.date.clone(),
                    status: inv.status,
                })
            })
            .filter(|row| {
                matches_ci(&row.name, query)
                    || matches_ci(&row.email, query)
                    || matches_ci(&row.amount.to_string(), query)
                    || matches_ci(&row.date, query)
                    || matches_ci(row.status.as_str(), query)
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        rows
    }
}

fn total_overflow() -> StorageError {
    StorageError::InvalidRow("invoice amount total overflows".into())
}

/// In-memory store with optional failure injection.
#[derive(Default)]
pub struct MockStore {
    tables: RwLock<Tables>,
    fail_on_write: RwLock<bool>,
    fail_on_read: RwLock<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write return `Unavailable`.
    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Make every subsequent read return `Unavailable`.
    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn customer_count(&self) -> usize {
        self.tables.read().await.customers.len()
    }

    pub async fn invoice_count(&self) -> usize {
        self.tables.read().await.invoices.len()
    }

    /// Invoices belonging to one customer.
    pub async fn invoices_for(&self, customer_id: &str) -> Vec<Invoice> {
        self.tables
            .read()
            .await
            .invoices
            .iter()
            .filter(|inv| inv.customer_id == customer_id)
            .cloned()
            .collect()
    }

    async fn check_write(&self) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MockStore {
    async fn list_all(&self) -> Result<Vec<Customer>> {
        self.check_read().await?;
        let mut customers = self.tables.read().await.customers.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn list_fields(&self) -> Result<Vec<CustomerField>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .map(|c| CustomerField {
                id: c.id,
                name: c.name,
            })
            .collect())
    }

    async fn filtered_table(&self, query: &str) -> Result<Vec<CustomerTableRow>> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        let mut rows = tables
            .customers
            .iter()
            .filter(|c| {
                matches_ci(&c.name, query)
                    || matches_ci(&c.email, query)
                    || matches_ci(&c.company, query)
            })
            .map(|c| {
                let owned = tables.invoices.iter().filter(|inv| inv.customer_id == c.id);
                let sum = |status: InvoiceStatus| {
                    checked_total(
                        owned
                            .clone()
                            .filter(|inv| inv.status == status)
                            .map(|inv| inv.amount),
                    )
                    .ok_or_else(total_overflow)
                };
                Ok(CustomerTableRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    email: c.email.clone(),
                    image_url: c.image_url.clone(),
                    total_invoices: owned.clone().count() as i64,
                    total_pending: sum(InvoiceStatus::Pending)?,
                    total_paid: sum(InvoiceStatus::Paid)?,
                })
            })
            .collect::<Result<Vec<CustomerTableRow>>>()?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get(&self, id: &str) -> Result<Option<Customer>> {
        self.check_read().await?;
        Ok(self.tables.read().await.customer(id).cloned())
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer> {
        self.check_write().await?;
        let created = Customer {
            id: new_id(),
            name: customer.name,
            email: customer.email,
            image_url: customer.image_url,
            status: customer.status,
            phone: customer.phone,
            company: customer.company,
            location: customer.location,
        };
        self.tables.write().await.customers.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, update: CustomerUpdate) -> Result<Customer> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StorageError::not_found("customer", id))?;
        customer.name = update.name;
        customer.email = update.email;
        customer.status = update.status;
        customer.phone = update.phone;
        customer.company = update.company;
        customer.location = update.location;
        if let Some(image_url) = update.image_url {
            customer.image_url = image_url;
        }
        Ok(customer.clone())
    }

    async fn delete_with_invoices(&self, id: &str) -> Result<u64> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        if tables.customer(id).is_none() {
            return Err(StorageError::not_found("customer", id));
        }
        let before = tables.invoices.len();
        tables.invoices.retain(|inv| inv.customer_id != id);
        let removed = (before - tables.invoices.len()) as u64;
        tables.customers.retain(|c| c.id != id);
        Ok(removed)
    }

    async fn seed(&self, customers: &[Customer]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for customer in customers {
            if tables.customer(&customer.id).is_none() {
                tables.customers.push(customer.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for MockStore {
    async fn filtered(&self, query: &str, page: u64) -> Result<Vec<InvoiceRow>> {
        self.check_read().await?;
        Ok(self
            .tables
            .read()
            .await
            .invoice_rows(query)
            .into_iter()
            .skip(page_offset(page) as usize)
            .take(ITEMS_PER_PAGE as usize)
            .collect())
    }

    async fn total_pages(&self, query: &str) -> Result<u64> {
        self.check_read().await?;
        let count = self.tables.read().await.invoice_rows(query).len();
        Ok(total_pages(count as u64))
    }

    async fn page_after(&self, query: &str, offset: u64, limit: u64) -> Result<InvoicePage> {
        self.check_read().await?;
        let rows: Vec<InvoiceRow> = self
            .tables
            .read()
            .await
            .invoice_rows(query)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize + 1)
            .collect();
        let (data, next_cursor) = split_page(rows, offset, limit);
        Ok(InvoicePage { data, next_cursor })
    }

    async fn get_form(&self, id: &str) -> Result<Option<InvoiceForm>> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        Ok(tables.invoices.iter().find(|inv| inv.id == id).map(|inv| {
            InvoiceForm::from_cents(
                inv.id.clone(),
                inv.customer_id.clone(),
                inv.amount,
                inv.status,
            )
        }))
    }

    async fn create(&self, invoice: NewInvoice) -> Result<Invoice> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        if tables.customer(&invoice.customer_id).is_none() {
            return Err(StorageError::CustomerNotFound(invoice.customer_id));
        }
        let created = Invoice {
            id: new_id(),
            customer_id: invoice.customer_id,
            amount: invoice.amount,
            status: invoice.status,
            date: invoice.date,
        };
        tables.invoices.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, update: InvoiceUpdate) -> Result<Invoice> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        if tables.customer(&update.customer_id).is_none() {
            return Err(StorageError::CustomerNotFound(update.customer_id));
        }
        let invoice = tables
            .invoices
            .iter_mut()
            .find(|inv| inv.id == id)
            .ok_or_else(|| StorageError::not_found("invoice", id))?;
        invoice.customer_id = update.customer_id;
        invoice.amount = update.amount;
        invoice.status = update.status;
        Ok(invoice.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let before = tables.invoices.len();
        tables.invoices.retain(|inv| inv.id != id);
        if tables.invoices.len() == before {
            return Err(StorageError::not_found("invoice", id));
        }
        Ok(())
    }

    async fn seed(&self, invoices: &[Invoice]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for invoice in invoices {
            if tables.customer(&invoice.customer_id).is_none() {
                return Err(StorageError::CustomerNotFound(invoice.customer_id.clone()));
            }
            if !tables.invoices.iter().any(|inv| inv.id == invoice.id) {
                tables.invoices.push(invoice.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardStore for MockStore {
    async fn revenue(&self) -> Result<Vec<Revenue>> {
        self.check_read().await?;
        Ok(self.tables.read().await.revenue.clone())
    }

    async fn latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        self.check_read().await?;
        Ok(self
            .tables
            .read()
            .await
            .invoice_rows("")
            .into_iter()
            .take(5)
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                amount: format_currency(row.amount),
            })
            .collect())
    }

    async fn card_totals(&self) -> Result<CardTotals> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        let sum = |status: InvoiceStatus| {
            checked_total(
                tables
                    .invoices
                    .iter()
                    .filter(|inv| inv.status == status)
                    .map(|inv| inv.amount),
            )
            .ok_or_else(total_overflow)
        };
        Ok(CardTotals {
            invoice_count: tables.invoices.len() as i64,
            customer_count: tables.customers.len() as i64,
            paid_cents: sum(InvoiceStatus::Paid)?,
            pending_cents: sum(InvoiceStatus::Pending)?,
        })
    }

    async fn seed_revenue(&self, revenue: &[Revenue]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for row in revenue {
            if !tables.revenue.iter().any(|r| r.month == row.month) {
                tables.revenue.push(row.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MockStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict(
                "user with this email already exists".into(),
            ));
        }
        let created = User {
            id: new_id(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            profile: UserProfile::default(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_summaries(&self) -> Result<Vec<UserSummary>> {
        self.check_read().await?;
        let mut users: Vec<UserSummary> = self
            .tables
            .read()
            .await
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn update_profile(&self, id: &str, name: &str, profile: UserProfile) -> Result<User> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StorageError::not_found("user", id))?;
        user.name = name.to_string();
        user.profile = profile;
        Ok(user.clone())
    }

    async fn seed(&self, users: &[User]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for user in users {
            if !tables.users.iter().any(|u| u.id == user.id) {
                tables.users.push(user.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MockStore {
    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>> {
        self.check_read().await?;
        let mut products: Vec<Product> = self
            .tables
            .read()
            .await
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        products.sort_by_key(|p| Reverse(p.created_at.clone()));
        Ok(products)
    }

    async fn get(&self, id: &str) -> Result<Option<Product>> {
        self.check_read().await?;
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, input: ProductInput) -> Result<Product> {
        self.check_write().await?;
        let now = now_rfc3339();
        let created = Product {
            id: new_id(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            image_url: input.image_url,
            status: input.status,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tables.write().await.products.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, input: ProductInput) -> Result<Product> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("product", id))?;
        product.name = input.name;
        product.description = input.description;
        product.price = input.price;
        product.category = input.category;
        product.image_url = input.image_url;
        product.status = input.status;
        product.updated_at = now_rfc3339();
        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(StorageError::not_found("product", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
