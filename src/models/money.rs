//! Minor-unit currency helpers.

/// Format cents as US dollars with thousands separators, e.g. `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = abs / 100;
    let remainder = abs % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Largest amount a single invoice or price may hold, in cents. Matches a
/// 32-bit `integer` column so aggregate sums stay far from `i64` overflow.
pub const MAX_AMOUNT_CENTS: i64 = i32::MAX as i64;

/// Convert a dollar amount entered in a form to cents, rounding to the
/// nearest cent. `None` when the result is not representable within
/// `MAX_AMOUNT_CENTS` in either direction.
pub fn dollars_to_cents(dollars: f64) -> Option<i64> {
    let cents = (dollars * 100.0).round();
    if cents.is_finite() && cents.abs() <= MAX_AMOUNT_CENTS as f64 {
        Some(cents as i64)
    } else {
        None
    }
}

/// Convert stored cents back to dollars for edit forms.
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}
