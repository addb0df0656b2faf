//! Formatting utilities for metric display.

use rust_decimal::Decimal;

/// Format an already-percent metric value (e.g. win rate) for display.
#[must_use]
pub fn format_pct(value: Decimal) -> String {
    format!("{value:.2}%")
}

/// Format a decimal with 2 decimal places.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    format!("{value:.2}")
}

/// Format a nullable ratio, rendering the degenerate case as "N/A".
#[must_use]
pub fn format_ratio(value: Option<Decimal>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
