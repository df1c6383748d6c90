//! Formatting helpers shared by the TUI, the CLI and the server

use chrono::{DateTime, Local, Utc};

use crate::core::indicators::gas_balance_sui;

/// Format a counter with thousands separators (`1234567` -> `1,234,567`)
pub fn format_count(value: f64) -> String {
    let whole = if value.is_finite() { value.max(0.0).round() as u64 } else { 0 };
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Gas balance in SUI with two decimals
pub fn format_sui(mist: f64) -> String {
    format!("{:.2} SUI", gas_balance_sui(mist))
}

/// Percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Local wall-clock time, e.g. `14:03:27`
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%H:%M:%S").to_string()
}

/// Local calendar date, e.g. `2024-11-02`
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%Y-%m-%d").to_string()
}

/// Turn a camelCase counter key into words (`signatureAggregation` -> `signature aggregation`)
pub fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 8);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Truncate string with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
