//! Receipt text parser
//!
//! Turns reading-order recognized lines into a `ParsedReceipt`:
//!
//! raw lines → normalize → classify → totals + items → sanity checks
//!
//! Parsing never fails. Anything that cannot be detected is left as `None`,
//! and inconsistencies are reported as warnings on the result.

pub mod classify;
pub mod items;
pub mod normalize;
pub mod sanity;
pub mod totals;

use tracing::info;

use crate::models::ParsedReceipt;
use crate::rules::RuleSet;

pub use classify::{
    classify_line, is_likely_merchant_line, is_metadata_line, is_totals_line, ClassifiedLine,
    LineKind,
};
pub use items::{parse_item_line, ItemLine};
pub use totals::{find_money, ExtractedTotals};

/// Rule-based receipt parser
#[derive(Debug, Clone, Default)]
pub struct ReceiptParser {
    rules: RuleSet,
}

impl ReceiptParser {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Parse recognized lines (already in reading order)
    ///
    /// `full_text` is only retained for audit.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S], full_text: &str) -> ParsedReceipt {
        let normalized = normalize::merge_split_prices(normalize::normalize_lines(lines));
        let classified: Vec<ClassifiedLine<'_>> = normalized
            .iter()
            .map(|line| classify_line(&self.rules, line))
            .collect();

        let extracted = totals::extract_totals(&self.rules, &classified);
        let mut receipt = ParsedReceipt {
            merchant_name: classify::find_merchant(&self.rules, &classified),
            items: items::parse_items(&self.rules, &classified),
            subtotal: extracted.subtotal,
            tax: extracted.tax_plus_fees(),
            tip: extracted.tip,
            total: extracted.total,
            raw_text: full_text.to_string(),
            warnings: Vec::new(),
        };

        sanity::check_receipt(&self.rules.tolerances, &mut receipt);

        info!(
            "Parsed receipt: {} lines, {} items, {} warnings",
            classified.len(),
            receipt.items.len(),
            receipt.warnings.len()
        );

        receipt
    }
}

/// Parse with the embedded default rules
pub fn parse_receipt<S: AsRef<str>>(lines: &[S], full_text: &str) -> ParsedReceipt {
    ReceiptParser::default().parse(lines, full_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn diner_lines() -> Vec<&'static str> {
        vec![
            "JOE'S DINER",
            "123 Main St",
            "Brooklyn, NY 11201",
            "Server: Maria   Table 12",
            "03/14/2024 7:05 PM",
            "2 Burger 24.00",
            "Fries\t4.50",
            "Milkshake",
            "6.00",
            "Subtotal 34.50",
            "Sales Tax 3.06",
            "Service Charge 2.00",
            "Tip 6.90",
            "TOTAL $46.46",
            "Thank you!",
        ]
    }

    #[test]
    fn test_full_parse() {
        let lines = diner_lines();
        let receipt = parse_receipt(&lines, &lines.join("\n"));

        assert_eq!(receipt.merchant_name.as_deref(), Some("JOE'S DINER"));
        let names: Vec<_> = receipt.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Burger", "Burger", "Fries", "Milkshake"]);
        assert_eq!(receipt.items_sum(), Money::from_cents(3450));
        assert_eq!(receipt.subtotal, Some(Money::from_cents(3450)));
        assert_eq!(receipt.tax, Some(Money::from_cents(506)));
        assert_eq!(receipt.tip, Some(Money::from_cents(690)));
        assert_eq!(receipt.total, Some(Money::from_cents(4646)));
        assert!(receipt.warnings.is_empty(), "{:?}", receipt.warnings);
        assert!(receipt.raw_text.contains("JOE'S DINER"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = ReceiptParser::default();
        let lines = diner_lines();
        let a = parser.parse(&lines, "");
        let b = parser.parse(&lines, "");
        assert_eq!(a.items.len(), b.items.len());
        assert_eq!(a.total, b.total);
        assert_eq!(a.warnings, b.warnings);
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = Vec::new();
        let receipt = parse_receipt(&lines, "");
        assert!(receipt.items.is_empty());
        assert_eq!(receipt.merchant_name, None);
        assert_eq!(receipt.total, None);
        assert_eq!(receipt.warnings.len(), 1);
    }

    #[test]
    fn test_oversized_amounts_do_not_halt_parsing() {
        let lines = ["Gift card 90000000000000000", "Voucher 90000000000000000"];
        let receipt = parse_receipt(&lines, "");
        assert!(receipt.items.is_empty());
        assert_eq!(receipt.warnings.len(), 1);

        // The largest accepted amounts still sum without overflowing
        let lines = [
            "Gift card 999999999999.99",
            "Voucher 999999999999.98",
            "Subtotal 999999999999.97",
        ];
        let receipt = parse_receipt(&lines, "");
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items_sum(), Money::from_cents(199_999_999_999_997));
        assert_eq!(receipt.total, Some(Money::from_cents(99_999_999_999_997)));
    }

    #[test]
    fn test_custom_rules() {
        let rules = RuleSet::from_toml(
            r#"
[keywords]
totals = ["subtotal", "propina", "total"]
tip = ["propina"]
"#,
        )
        .unwrap();
        let parser = ReceiptParser::new(rules);
        let receipt = parser.parse(&["Tacos 10.00", "Subtotal 10.00", "Propina 2.00"], "");
        assert_eq!(receipt.tip, Some(Money::from_cents(200)));
        assert_eq!(receipt.total, Some(Money::from_cents(1200)));
    }
}
