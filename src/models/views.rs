//! Read models returned by the data-access layer and rendered by pages.

use serde::{Deserialize, Serialize};

use super::money::{cents_to_dollars, format_currency};
use super::{InvoiceStatus, Role};

/// One of the five most recent invoices shown on the overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestInvoice {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    /// Formatted currency, e.g. `$157.95`.
    pub amount: String,
}

/// Invoice joined with its customer for the invoices table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: i64,
    pub date: String,
    pub status: InvoiceStatus,
}

/// A slice of invoices plus the offset of the next slice, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePage {
    pub data: Vec<InvoiceRow>,
    pub next_cursor: Option<u64>,
}

/// Invoice as loaded into the edit form. `amount` is in dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceForm {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    pub fn from_cents(id: String, customer_id: String, cents: i64, status: InvoiceStatus) -> Self {
        Self {
            id,
            customer_id,
            amount: cents_to_dollars(cents),
            status,
        }
    }
}

/// Customer option for select inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerField {
    pub id: String,
    pub name: String,
}

/// Customer with aggregated invoice totals (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTableRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: i64,
    pub total_paid: i64,
}

/// `CustomerTableRow` with totals formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedCustomerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: String,
    pub total_paid: String,
}

impl From<CustomerTableRow> for FormattedCustomerRow {
    fn from(row: CustomerTableRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            total_invoices: row.total_invoices,
            total_pending: format_currency(row.total_pending),
            total_paid: format_currency(row.total_paid),
        }
    }
}

/// Raw dashboard card figures computed from invoice and customer rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTotals {
    pub invoice_count: i64,
    pub customer_count: i64,
    pub paid_cents: i64,
    pub pending_cents: i64,
}

/// Dashboard card figures as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub number_of_customers: i64,
    pub number_of_invoices: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}

impl From<CardTotals> for CardData {
    fn from(totals: CardTotals) -> Self {
        Self {
            number_of_customers: totals.customer_count,
            number_of_invoices: totals.invoice_count,
            total_paid_invoices: format_currency(totals.paid_cents),
            total_pending_invoices: format_currency(totals.pending_cents),
        }
    }
}

/// User listing for the admin API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}
