//! Subtotal / tax / fee / tip / total extraction
//!
//! Totals are found by keyword anchors rather than position: each value comes
//! from a totals line containing one of its keywords, reading the amount at the
//! end of the line or, failing that, the first amount inside it.

use crate::money::{embedded_money, trailing_money, Money};
use crate::rules::{contains_any, RuleSet};

use super::classify::{ClassifiedLine, LineKind};

/// Raw values found by the extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractedTotals {
    pub subtotal: Option<Money>,
    /// Service fees and mandatory gratuity
    pub fees: Option<Money>,
    pub tax_only: Option<Money>,
    pub tip: Option<Money>,
    pub total: Option<Money>,
}

impl ExtractedTotals {
    /// Tax and fees combined; absent only when both are absent
    pub fn tax_plus_fees(&self) -> Option<Money> {
        match (self.tax_only, self.fees) {
            (None, None) => None,
            (tax, fees) => Some(tax.unwrap_or_default() + fees.unwrap_or_default()),
        }
    }
}

/// Amount at the end of `line`, else the first two-decimal amount in it
fn read_amount(line: &str) -> Option<Money> {
    trailing_money(line)
        .map(|t| t.amount)
        .or_else(|| embedded_money(line))
}

/// Find the first keyword line (last when `prefer_last`) that yields an amount
///
/// Lines that also contain an `exclude` keyword are skipped.
pub fn find_money(
    keywords: &[String],
    exclude: &[String],
    lines: &[ClassifiedLine<'_>],
    prefer_last: bool,
) -> Option<Money> {
    let read = |line: &ClassifiedLine<'_>| {
        if line.kind != LineKind::TotalsKeyword
            || !contains_any(&line.lowered, keywords)
            || contains_any(&line.lowered, exclude)
        {
            return None;
        }
        read_amount(line.text)
    };

    if prefer_last {
        lines.iter().rev().find_map(read)
    } else {
        lines.iter().find_map(read)
    }
}

pub fn extract_totals(rules: &RuleSet, lines: &[ClassifiedLine<'_>]) -> ExtractedTotals {
    ExtractedTotals {
        subtotal: find_money(&rules.subtotal_keywords, &[], lines, false),
        fees: find_money(&rules.fee_keywords, &[], lines, false),
        tax_only: find_money(&rules.tax_keywords, &[], lines, false),
        tip: find_money(&rules.tip_keywords, &[], lines, true),
        total: find_money(
            &rules.total_keywords,
            &rules.total_exclude_keywords,
            lines,
            true,
        ),
    }
}
