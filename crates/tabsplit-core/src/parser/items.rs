//! Item line parsing
//!
//! An item line is `[qty[x]] name amount`. The amount is the line total, so a
//! quantity expands into that many items at `amount / qty` each (truncating).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::ReceiptItem;
use crate::money::{trailing_money, Money};
use crate::rules::RuleSet;

use super::classify::{ClassifiedLine, LineKind};

fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[xX]?\s+(.+)$").expect("invalid quantity regex"))
}

/// One accepted item line, before quantity expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLine {
    pub quantity: u32,
    pub name: String,
    pub unit_amount: Money,
    pub source: String,
}

impl ItemLine {
    pub fn expand(&self) -> impl Iterator<Item = ReceiptItem> + '_ {
        (0..self.quantity)
            .map(move |_| ReceiptItem::with_source(&self.name, self.unit_amount, &self.source))
    }
}

fn clean_name(name: &str) -> &str {
    name.trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '$' | '@' | ':' | '-' | '*'))
}

/// Parse a single normalized line as an item, if it looks like one
pub fn parse_item_line(rules: &RuleSet, line: &str) -> Option<ItemLine> {
    let trailing = trailing_money(line)?;
    let label = line[..trailing.start].trim();

    if !label.chars().any(char::is_alphabetic) {
        debug!("Rejecting item line without a name: {:?}", line);
        return None;
    }

    let (quantity, rest) = match quantity_re().captures(label) {
        Some(caps) => {
            let qty = caps[1].parse::<u32>().unwrap_or(0);
            if (1..=rules.max_quantity).contains(&qty) {
                (qty, caps.get(2).map_or(label, |m| m.as_str()))
            } else {
                (1, label)
            }
        }
        None => (1, label),
    };

    let name = clean_name(rest);
    let lowered = name.to_lowercase();
    if !name.chars().any(char::is_alphabetic)
        || rules.is_metadata_line(&lowered)
        || rules.is_totals_line(&lowered)
    {
        debug!("Rejecting item name {:?} from line {:?}", name, line);
        return None;
    }

    Some(ItemLine {
        quantity,
        name: name.to_string(),
        unit_amount: trailing.amount / i64::from(quantity),
        source: line.to_string(),
    })
}

/// Parse every item candidate line, dropping repeated detections
///
/// Overlapping recognition regions can report the same physical line twice;
/// a line whose (name, unit amount) was already seen is dropped.
pub fn parse_items(rules: &RuleSet, lines: &[ClassifiedLine<'_>]) -> Vec<ReceiptItem> {
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    let mut items = Vec::new();

    for line in lines.iter().filter(|l| l.kind == LineKind::ItemCandidate) {
        let Some(item_line) = parse_item_line(rules, line.text) else {
            continue;
        };

        let key = (item_line.name.to_lowercase(), item_line.unit_amount.cents());
        if !seen.insert(key) {
            debug!("Dropping duplicate item line {:?}", line.text);
            continue;
        }

        items.extend(item_line.expand());
    }

    items
}
