//! Cost allocation across participants
//!
//! Each assigned item is divided evenly among its assignees (truncating), tax
//! and tip follow each person's share of the items sum, and whatever no one
//! covers is reported as "unallocated".
//!
//! When every item has an assignee and the item shares partition the items sum
//! exactly, the rounding remainder of tax and tip is handed to the participant
//! sorted last by name, so shares add up to the receipt to the cent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Participant, Receipt, ReceiptItem};
use crate::money::Money;

/// One participant's share of a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRow {
    pub participant_id: Uuid,
    pub name: String,
    /// Human-readable description of each assigned item
    pub items: Vec<String>,
    pub subtotal: Money,
    pub tax_share: Money,
    pub tip_share: Money,
}

impl PersonRow {
    fn new(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id,
            name: participant.name.clone(),
            items: Vec::new(),
            subtotal: Money::ZERO,
            tax_share: Money::ZERO,
            tip_share: Money::ZERO,
        }
    }

    pub fn total(&self) -> Money {
        self.subtotal + self.tax_share + self.tip_share
    }
}

/// Per-person breakdown plus whatever is left unattributed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Sorted by participant name, case-insensitive
    pub rows: Vec<PersonRow>,
    pub sum_subtotal: Money,
    pub sum_tax: Money,
    pub sum_tip: Money,
    pub sum_total: Money,
    pub unallocated_subtotal: Money,
    pub unallocated_tax: Money,
    pub unallocated_tip: Money,
    pub unallocated_total: Money,
    pub is_fully_assigned: bool,
    /// Tax/tip remainder was moved onto the last row
    pub reconciled: bool,
}

impl AllocationResult {
    fn tally(&mut self, receipt_subtotal: Money, receipt_tax: Money, receipt_tip: Money) {
        self.sum_subtotal = self.rows.iter().map(|r| r.subtotal).sum();
        self.sum_tax = self.rows.iter().map(|r| r.tax_share).sum();
        self.sum_tip = self.rows.iter().map(|r| r.tip_share).sum();
        self.sum_total = self.sum_subtotal + self.sum_tax + self.sum_tip;

        self.unallocated_subtotal = receipt_subtotal - self.sum_subtotal;
        self.unallocated_tax = receipt_tax - self.sum_tax;
        self.unallocated_tip = receipt_tip - self.sum_tip;
        self.unallocated_total =
            self.unallocated_subtotal + self.unallocated_tax + self.unallocated_tip;
    }

    pub fn row(&self, name: &str) -> Option<&PersonRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Round `num / den` to the nearest integer, halves away from zero
fn div_round(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if 2 * r.abs() >= den.abs() {
        q + num.signum() * den.signum()
    } else {
        q
    }
}

/// `amount * part / whole`, rounded to the cent; zero when `whole` is zero
fn proportional_share(amount: Money, part: Money, whole: Money) -> Money {
    if whole.is_zero() {
        return Money::ZERO;
    }
    let cents = div_round(
        i128::from(amount.cents()) * i128::from(part.cents()),
        i128::from(whole.cents()),
    );
    let cents = i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX });
    Money::from_cents(cents)
}

fn describe(item: &ReceiptItem, share: Money, ways: usize) -> String {
    if ways > 1 {
        format!(
            "{} (1/{} of ${} = ${})",
            item.name, ways, item.amount, share
        )
    } else {
        format!("{} (${})", item.name, item.amount)
    }
}

/// Compute each participant's share of a finalized receipt
///
/// The items sum is always the denominator, never the receipt's declared
/// subtotal, so `Σ row.subtotal + unallocated_subtotal` equals the items sum
/// exactly.
pub fn compute_allocation(receipt: &Receipt) -> AllocationResult {
    let receipt_subtotal = receipt.computed_items_sum();
    let receipt_tax = receipt.tax.unwrap_or_default();
    let receipt_tip = receipt.tip.unwrap_or_default();

    let mut rows: Vec<PersonRow> = receipt.participants.iter().map(PersonRow::new).collect();
    rows.sort_by_cached_key(|r| r.name.to_lowercase());
    let index: HashMap<Uuid, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.participant_id, i))
        .collect();

    for item in &receipt.items {
        let assignees = receipt.assignees(item.id);
        if assignees.is_empty() {
            debug!("Item {:?} is unassigned", item.name);
            continue;
        }

        let ways = assignees.len();
        let share = item.amount / ways as i64;
        for participant in assignees {
            if let Some(&i) = index.get(&participant.id) {
                rows[i].subtotal += share;
                rows[i].items.push(describe(item, share, ways));
            }
        }
    }

    for row in &mut rows {
        row.tax_share = proportional_share(receipt_tax, row.subtotal, receipt_subtotal);
        row.tip_share = proportional_share(receipt_tip, row.subtotal, receipt_subtotal);
    }

    let mut result = AllocationResult {
        rows,
        is_fully_assigned: receipt.is_fully_assigned(),
        ..Default::default()
    };
    result.tally(receipt_subtotal, receipt_tax, receipt_tip);

    if result.is_fully_assigned && result.unallocated_subtotal.is_zero() {
        let tax_remainder = result.unallocated_tax;
        let tip_remainder = result.unallocated_tip;
        if let Some(last) = result.rows.last_mut() {
            debug!(
                "Reconciling tax {} and tip {} onto {}",
                tax_remainder, tip_remainder, last.name
            );
            last.tax_share += tax_remainder;
            last.tip_share += tip_remainder;
            result.reconciled = true;
            result.tally(receipt_subtotal, receipt_tax, receipt_tip);
        }
    }

    info!(
        "Allocated {} across {} participants ({} unallocated)",
        result.sum_total,
        result.rows.len(),
        result.unallocated_total
    );

    result
}
