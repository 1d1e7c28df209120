//! Presentation helpers shared by the shell views.

use chrono::NaiveDate;

/// Formats an amount with two decimals and the currency's symbol when known.
pub fn format_amount(amount: f64, currency: &str) -> String {
    match currency_symbol(currency) {
        Some(symbol) => format!("{symbol}{amount:.2}"),
        None => format!("{amount:.2} {}", currency.trim().to_ascii_uppercase()),
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.trim().to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// "March 2024"
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// "Mar 5" for parseable dates; the raw text otherwise.
pub fn short_date(raw: &str, parsed: Option<NaiveDate>) -> String {
    parsed
        .map(|date| date.format("%b %-d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Fixed-width text bar for percentage displays.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled.min(width)))
}
