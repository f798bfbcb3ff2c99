//! Line cleanup ahead of classification
//!
//! Input order is preserved; it is assumed to already follow the receipt's
//! top-to-bottom reading order.

use crate::money::trailing_money;

/// Collapse whitespace runs (tabs included), trim, and drop empty lines
pub fn normalize_lines<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|line| line.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// A line that is nothing but a decimal amount, e.g. `"12.50"` or `"$3.00"`
fn is_price_only(line: &str) -> bool {
    line.contains('.') && trailing_money(line).is_some_and(|t| t.start == 0)
}

/// Join a label line with the price-only line right below it
///
/// Recognition sometimes returns a label and its price column as separate
/// regions: `"Burger"`, `"12.50"` becomes `"Burger 12.50"`.
pub fn merge_split_prices(lines: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();

    while let Some(line) = iter.next() {
        let is_label =
            line.chars().any(char::is_alphabetic) && trailing_money(&line).is_none();
        match iter.peek() {
            Some(next) if is_label && is_price_only(next) => {
                let price = iter.next().unwrap_or_default();
                merged.push(format!("{} {}", line, price));
            }
            _ => merged.push(line),
        }
    }

    merged
}
