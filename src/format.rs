//! Display formatting for prices, quantities and money.
//!
//! Rounding is half-away-from-zero to match what users see on the web
//! front end of the same backend.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder for values the backend has not provided yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a USD amount with two decimals and thousands separators.
///
/// `None` renders as `$0.00`.
pub fn format_currency(value: Option<Decimal>) -> String {
    let value = value.unwrap_or(Decimal::ZERO);
    let body = grouped_fixed(value.abs(), 2);
    if value.is_sign_negative() && !is_zero_at(value, 2) {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Formats a signed profit/loss amount as `+$1.00` / `-$1.00`.
pub fn format_signed_currency(value: Decimal) -> String {
    let body = grouped_fixed(value.abs(), 2);
    if value.is_sign_negative() && !is_zero_at(value, 2) {
        format!("-${body}")
    } else {
        format!("+${body}")
    }
}

/// Formats a crypto quantity with exactly eight decimals.
pub fn format_crypto_amount(value: Option<Decimal>) -> String {
    match value {
        Some(v) => signed(v, grouped_fixed(v.abs(), 8), 8),
        None => "0".to_string(),
    }
}

/// Formats a unit price with precision depending on its magnitude.
///
/// | price        | decimals             |
/// |--------------|----------------------|
/// | `< 0.01`     | 8                    |
/// | `< 1`        | 6                    |
/// | `< 1000`     | 2                    |
/// | otherwise    | grouped, at most 2   |
///
/// Missing or zero prices render as `N/A`.
pub fn format_price(value: Option<Decimal>) -> String {
    let Some(price) = value.filter(|p| !p.is_zero()) else {
        return NOT_AVAILABLE.to_string();
    };

    if price < Decimal::new(1, 2) {
        fixed(price, 8)
    } else if price < Decimal::ONE {
        fixed(price, 6)
    } else if price < Decimal::ONE_THOUSAND {
        fixed(price, 2)
    } else {
        grouped_max(price, 2)
    }
}

/// Formats a 24h volume grouped with at most three decimals.
pub fn format_volume(value: Option<Decimal>) -> String {
    match value.filter(|v| !v.is_zero()) {
        Some(v) => signed(v, grouped_max(v.abs(), 3), 3),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Formats a backend timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

fn is_zero_at(value: Decimal, decimals: u32) -> bool {
    round(value, decimals).is_zero()
}

fn signed(value: Decimal, body: String, decimals: u32) -> String {
    if value.is_sign_negative() && !is_zero_at(value, decimals) {
        format!("-{body}")
    } else {
        body
    }
}

/// Fixed decimals, no grouping.
fn fixed(value: Decimal, decimals: u32) -> String {
    let rounded = round(value, decimals);
    format!("{:.*}", decimals as usize, rounded)
}

/// Fixed decimals with thousands separators. `value` must be non-negative.
fn grouped_fixed(value: Decimal, decimals: u32) -> String {
    let text = fixed(value, decimals);
    match text.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_thousands(int_part)),
        None => group_thousands(&text),
    }
}

/// Up to `decimals` decimals (trailing zeros trimmed) with separators.
fn grouped_max(value: Decimal, decimals: u32) -> String {
    let text = grouped_fixed(value, decimals);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Inserts `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
