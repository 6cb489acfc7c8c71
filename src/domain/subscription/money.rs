//! Display helpers for amounts. Formatting never feeds back into arithmetic:
//! amounts stay `Decimal` and are only turned into text at the edge.

use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_money(self.amount, &self.currency))
    }
}

/// Client-side figure that has not been confirmed by the backend.
/// Kept as a separate type so it cannot be mistaken for a calculated total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate(Money);

impl Estimate {
    pub fn new(money: Money) -> Self {
        Self(money)
    }

    pub fn money(&self) -> &Money {
        &self.0
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{} (estimate)", self.0)
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// `$1,234.50` style rendering. At least two decimals are shown; extra
/// precision in the amount is kept rather than rounded away.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let currency = currency.to_ascii_uppercase();
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    let mut value = amount.abs().normalize();
    if value.scale() < 2 {
        value.rescale(2);
    }

    let text = value.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = group_thousands(whole);

    match currency_symbol(&currency) {
        Some(symbol) => format!("{}{}{}.{}", sign, symbol, grouped, fraction),
        None => format!("{}{}.{} {}", sign, grouped, fraction, currency),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_duration(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}
