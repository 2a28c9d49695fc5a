//! Key registry for every dashboard query, plus the mapping from server
//! revalidation paths to the key prefixes they make stale.

use crate::key::{params, QueryKey};

pub fn revenue() -> QueryKey {
    QueryKey::of(["revenue"])
}

pub fn latest_invoices() -> QueryKey {
    QueryKey::of(["invoices", "latest"])
}

pub fn card_data() -> QueryKey {
    QueryKey::of(["dashboard", "cards"])
}

/// One page of the invoices table.
pub fn invoices(query: &str, page: u64) -> QueryKey {
    QueryKey::of(["invoices"]).with(params([
        ("query", query.to_string()),
        ("page", page.to_string()),
    ]))
}

pub fn invoices_pages(query: &str) -> QueryKey {
    QueryKey::of(["invoices", "pages", query])
}

pub fn invoice(id: &str) -> QueryKey {
    QueryKey::of(["invoices", id])
}

pub fn customers() -> QueryKey {
    QueryKey::of(["customers"])
}

pub fn filtered_customers(query: &str) -> QueryKey {
    QueryKey::of(["customers", "filtered", query])
}

pub fn infinite_invoices(query: &str) -> QueryKey {
    QueryKey::of(["invoices", "infinite", query])
}

/// Prefix covering every invoice query.
pub fn all_invoices() -> QueryKey {
    QueryKey::of(["invoices"])
}

/// Prefix covering every dashboard card query.
pub fn dashboard() -> QueryKey {
    QueryKey::of(["dashboard"])
}

/// Key prefixes to invalidate when the server revalidates `path`.
pub fn for_revalidated_path(path: &str) -> Vec<QueryKey> {
    match path {
        "/dashboard/invoices" => vec![all_invoices(), dashboard()],
        "/dashboard/customers" => vec![customers()],
        "/dashboard" => vec![dashboard(), revenue(), latest_invoices()],
        _ => Vec::new(),
    }
}
