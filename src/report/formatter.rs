// Markdown formatting utilities for report generation

use chrono::{DateTime, Utc};

/// Placeholder for undefined metrics
pub const UNDEFINED: &str = "n/a";

/// Build a markdown table from headers and rows
pub fn build_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = String::new();

    // Header row
    table.push_str("| ");
    table.push_str(&headers.join(" | "));
    table.push_str(" |\n");

    // Separator row
    table.push('|');
    for _ in headers {
        table.push_str("--------|");
    }
    table.push('\n');

    // Data rows
    for row in rows {
        table.push_str("| ");
        table.push_str(&row.join(" | "));
        table.push_str(" |\n");
    }

    table
}

/// Build a markdown bullet list from items
pub fn build_list(items: &[String]) -> String {
    let mut list = String::new();

    for item in items {
        list.push_str(&format!("- {}\n", item));
    }

    list
}

/// Build a markdown section header
pub fn build_section_header(title: &str, level: u8) -> String {
    let hashes = "#".repeat(level as usize);
    format!("{} {}\n\n", hashes, title)
}

/// Insert `,` every three digits of a non-negative integer string
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        grouped.push(ch);
        if (len - i - 1) % 3 == 0 && i < len - 1 {
            grouped.push(',');
        }
    }

    grouped
}

/// Format a strike as US dollars with thousand separators: 1234.5 -> "$1,234.50"
pub fn format_strike(strike: f64) -> String {
    let formatted = format!("{:.2}", strike.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let sign = if strike < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(integer), fraction)
}

/// Format a contract count with thousand separators
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format an optional count, undefined as `n/a`
pub fn format_optional_count(value: Option<u64>) -> String {
    value.map(format_count).unwrap_or_else(|| UNDEFINED.to_string())
}

/// Format a ratio with 2 decimals, undefined as `n/a`
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => UNDEFINED.to_string(),
    }
}

/// Format a relative volume multiple: 1.54 -> "1.5×"
pub fn format_multiple(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}×", v),
        None => UNDEFINED.to_string(),
    }
}

/// Format a fraction as a percentage: 0.4234 -> "42.34%"
pub fn format_fraction_pct(value: Option<f64>) -> String {
    format_optional_pct(value.map(|v| v * 100.0))
}

/// Format an optional percentage, undefined as `n/a`
pub fn format_optional_pct(value: Option<f64>) -> String {
    value
        .map(format_percentage)
        .unwrap_or_else(|| UNDEFINED.to_string())
}

/// Format a percentage value
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Format a DateTime<Utc> as human-readable string
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
