//! Input validation for submitted forms.
//!
//! Every form that crosses the trust boundary is deserialized into one of
//! these structs (raw strings, so invalid input can be echoed back) and
//! checked with `validator`. Failures become per-field message lists.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{
    dollars_to_cents, CustomerStatus, InvoiceStatus, ProductInput, ProductStatus, UserProfile,
};

/// Field name → messages, as rendered next to each input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Messages reported by the custom validators and action banners.
pub mod errmsg {
    pub const SELECT_CUSTOMER: &str = "Please select a customer.";
    pub const AMOUNT_POSITIVE: &str = "Please enter an amount greater than $0.";
    pub const SELECT_INVOICE_STATUS: &str = "Please select an invoice status.";
    pub const SELECT_STATUS: &str = "Please select a status";
    pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
    pub const PRICE_NON_NEGATIVE: &str = "Price must be a non-negative amount";
    pub const AMOUNT_TOO_LARGE: &str = "Amount is too large.";
}

fn error_with(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Coerce form text to a number the way a numeric form field would.
///
/// Blank input counts as zero; anything unparseable is `None`.
fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Form text to cents; zero when unparseable or out of range.
fn cents_of(raw: &str) -> i64 {
    coerce_number(raw).and_then(dollars_to_cents).unwrap_or(0)
}

/// Bounds apply to the rounded cents, which is what gets stored.
fn validate_amount(raw: &str) -> Result<(), ValidationError> {
    match coerce_number(raw) {
        Some(n) if n > 0.0 => match dollars_to_cents(n) {
            Some(cents) if cents >= 1 => Ok(()),
            Some(_) => Err(error_with("amount", errmsg::AMOUNT_POSITIVE)),
            None => Err(error_with("amount", errmsg::AMOUNT_TOO_LARGE)),
        },
        _ => Err(error_with("amount", errmsg::AMOUNT_POSITIVE)),
    }
}

fn validate_price(raw: &str) -> Result<(), ValidationError> {
    match coerce_number(raw) {
        Some(n) if n >= 0.0 => match dollars_to_cents(n) {
            Some(_) => Ok(()),
            None => Err(error_with("price", errmsg::AMOUNT_TOO_LARGE)),
        },
        _ => Err(error_with("price", errmsg::PRICE_NON_NEGATIVE)),
    }
}

fn validate_invoice_status(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<InvoiceStatus>()
        .map(|_| ())
        .map_err(|_| error_with("status", errmsg::SELECT_INVOICE_STATUS))
}

fn validate_customer_status(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<CustomerStatus>()
        .map(|_| ())
        .map_err(|_| error_with("status", errmsg::SELECT_STATUS))
}

fn validate_product_status(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<ProductStatus>()
        .map(|_| ())
        .map_err(|_| error_with("status", errmsg::SELECT_STATUS))
}

/// Flatten `validator` errors into field → messages.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Accept a JSON number or string for numeric inputs, keeping the raw text
/// so it can be echoed back.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn trim_in_place(field: &mut String) {
    let trimmed = field.trim();
    if trimmed.len() != field.len() {
        *field = trimmed.to_string();
    }
}

/// Empty or whitespace-only text becomes `None`.
pub fn non_blank(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Invoice create/update form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct InvoiceForm {
    #[validate(length(min = 1, message = "Please select a customer."))]
    pub customer_id: String,
    #[serde(deserialize_with = "text_or_number")]
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,
    #[validate(custom(function = "validate_invoice_status"))]
    pub status: String,
}

impl InvoiceForm {
    /// Amount in cents. Only meaningful after `validate()` succeeded.
    pub fn amount_cents(&self) -> i64 {
        cents_of(&self.amount)
    }

    /// Parsed status. Only meaningful after `validate()` succeeded.
    pub fn status(&self) -> InvoiceStatus {
        self.status.parse().unwrap_or(InvoiceStatus::Pending)
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("customer_id".to_string(), self.customer_id.clone()),
            ("amount".to_string(), self.amount.clone()),
            ("status".to_string(), self.status.clone()),
        ])
    }
}

/// Customer create/update form. The avatar travels separately as a file.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CustomerForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 10, message = "Phone must be at least 10 characters"))]
    pub phone: String,
    #[validate(length(min = 2, message = "Company must be at least 2 characters"))]
    pub company: String,
    #[validate(length(min = 2, message = "Location must be at least 2 characters"))]
    pub location: String,
    #[validate(custom(function = "validate_customer_status"))]
    pub status: String,
}

impl CustomerForm {
    /// Strip surrounding whitespace so length rules see what gets stored.
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.email,
            &mut self.phone,
            &mut self.company,
            &mut self.location,
        ] {
            trim_in_place(field);
        }
        self
    }

    pub fn status(&self) -> CustomerStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("phone".to_string(), self.phone.clone()),
            ("company".to_string(), self.company.clone()),
            ("location".to_string(), self.location.clone()),
            ("status".to_string(), self.status.clone()),
        ])
    }
}

/// Credentials submitted to `/login`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

/// Registration submitted to `/signup`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

impl SignupForm {
    pub fn trimmed(mut self) -> Self {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.email);
        self
    }

    /// Full validation including the password confirmation.
    pub fn validate_all(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };
        if self.password != self.confirm_password {
            errors
                .entry("confirm_password".to_string())
                .or_default()
                .push(errmsg::PASSWORDS_DO_NOT_MATCH.to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
        ])
    }
}

/// Profile details editable by the signed-in user. Role is not editable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "Company must be less than 100 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "Location must be less than 100 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 32, message = "Phone must be less than 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Title must be less than 100 characters"))]
    pub title: Option<String>,
}

impl ProfileForm {
    pub fn trimmed(mut self) -> Self {
        trim_in_place(&mut self.name);
        self
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            company: non_blank(&self.company),
            location: non_blank(&self.location),
            phone: non_blank(&self.phone),
            title: non_blank(&self.title),
        }
    }
}

/// Admin product create/update payload. `price` is in dollars.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProductForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    #[validate(custom(function = "validate_price"))]
    pub price: String,
    #[validate(length(min = 2, message = "Category must be at least 2 characters"))]
    pub category: String,
    pub image_url: Option<String>,
    #[validate(custom(function = "validate_product_status"))]
    pub status: String,
}

impl ProductForm {
    pub fn trimmed(mut self) -> Self {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.category);
        self
    }

    /// Convert to the storage payload. Only meaningful after validation.
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            description: non_blank(&self.description),
            price: cents_of(&self.price),
            category: self.category.clone(),
            image_url: non_blank(&self.image_url),
            status: self.status.parse().unwrap_or_default(),
        }
    }
}
