//! Line classification
//!
//! Each normalized line is labelled once with a `LineKind`; the extractor and
//! item parser dispatch on that label instead of re-testing predicates.

use serde::Serialize;

use crate::money::trailing_money;
use crate::rules::RuleSet;

/// What a normalized line is taken to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Mentions subtotal, tax, fees, tip or total
    TotalsKeyword,
    /// Header/footer boilerplate: server, table, address, date, time...
    Metadata,
    /// Anything else; may or may not turn out to be an item
    ItemCandidate,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalsKeyword => "totals_keyword",
            Self::Metadata => "metadata",
            Self::ItemCandidate => "item_candidate",
        }
    }
}

/// A normalized line with its classification
#[derive(Debug, Clone)]
pub struct ClassifiedLine<'a> {
    pub text: &'a str,
    pub lowered: String,
    pub kind: LineKind,
}

/// Totals keywords win over metadata patterns
pub fn classify_line<'a>(rules: &RuleSet, text: &'a str) -> ClassifiedLine<'a> {
    let lowered = text.to_lowercase();
    let kind = if rules.is_totals_line(&lowered) {
        LineKind::TotalsKeyword
    } else if rules.is_metadata_line(&lowered) {
        LineKind::Metadata
    } else {
        LineKind::ItemCandidate
    };
    ClassifiedLine {
        text,
        lowered,
        kind,
    }
}

pub fn is_totals_line(rules: &RuleSet, line: &str) -> bool {
    rules.is_totals_line(&line.to_lowercase())
}

pub fn is_metadata_line(rules: &RuleSet, line: &str) -> bool {
    rules.is_metadata_line(&line.to_lowercase())
}

/// Header text that reads like a business name
pub fn is_likely_merchant_line(rules: &RuleSet, line: &str) -> bool {
    let lowered = line.to_lowercase();
    line.chars().count() >= rules.merchant.min_length
        && !rules.is_metadata_line(&lowered)
        && !rules.is_totals_line(&lowered)
        && trailing_money(line).is_none()
        && line.chars().any(char::is_alphabetic)
        && line.chars().filter(char::is_ascii_digit).count() <= rules.merchant.max_digits
}

/// First merchant-looking line near the top of the receipt
pub fn find_merchant(rules: &RuleSet, lines: &[ClassifiedLine<'_>]) -> Option<String> {
    lines
        .iter()
        .take(rules.merchant.search_lines)
        .find(|l| is_likely_merchant_line(rules, l.text))
        .map(|l| l.text.to_string())
}
