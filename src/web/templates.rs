//! Server-rendered pages.
//!
//! Templates are compiled into the binary and loaded into one `Tera`
//! instance at startup. Names ending in `.html` are autoescaped.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::auth::CurrentUser;
use crate::models::format_currency;
use crate::validation::FieldErrors;

const TEMPLATES: [(&str, &str); 11] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("invoices.html", include_str!("../../templates/invoices.html")),
    ("invoice_form.html", include_str!("../../templates/invoice_form.html")),
    ("customers.html", include_str!("../../templates/customers.html")),
    ("customer_form.html", include_str!("../../templates/customer_form.html")),
    ("admin.html", include_str!("../../templates/admin.html")),
    ("profile.html", include_str!("../../templates/profile.html")),
];

/// Compiled page templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.register_filter("currency", currency_filter);
        tera.register_filter("local_date", local_date_filter);
        Ok(Self { tera })
    }

    /// Render `name` with the page context.
    pub fn render(&self, name: &str, page: &PageContext) -> tera::Result<String> {
        self.tera.render(name, &page.context)
    }
}

/// Variables for one page render. Every page sees `user` and `path`.
pub struct PageContext {
    context: Context,
}

impl PageContext {
    pub fn new(path: &str, user: Option<&CurrentUser>) -> Self {
        let mut context = Context::new();
        context.insert("path", path);
        context.insert("user", &user);
        context.insert("is_admin", &user.map(CurrentUser::is_admin).unwrap_or(false));
        Self { context }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }
}

/// `{{ cents | currency }}` → `$1,234.56`.
fn currency_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let cents = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg("currency filter expects integer cents"))?;
    Ok(Value::String(format_currency(cents)))
}

/// `{{ "2023-06-09" | local_date }}` → `Jun 9, 2023`. Other text passes
/// through unchanged.
fn local_date_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("local_date filter expects a string"))?;
    let formatted = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| text.to_string());
    Ok(Value::String(formatted))
}

/// One labelled input with its current value and messages.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

/// Build inputs from `(name, label, type)` specs.
pub fn field_views(
    specs: &[(&'static str, &'static str, &'static str)],
    values: &BTreeMap<String, String>,
    errors: &FieldErrors,
) -> Vec<FieldView> {
    specs
        .iter()
        .map(|&(name, label, kind)| FieldView {
            name,
            label,
            kind,
            value: values.get(name).cloned().unwrap_or_default(),
            errors: errors.get(name).cloned().unwrap_or_default(),
        })
        .collect()
}
