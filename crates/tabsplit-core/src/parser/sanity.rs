//! Cross-checks between extracted items and totals
//!
//! Every finding becomes an advisory warning. The only value ever filled in is
//! a missing total, computed from subtotal + tax + tip.

use crate::models::ParsedReceipt;
use crate::money::Money;
use crate::rules::Tolerances;

pub fn check_receipt(tolerances: &Tolerances, receipt: &mut ParsedReceipt) {
    let items_sum = receipt.items_sum();
    let extras = receipt.tax.unwrap_or_default() + receipt.tip.unwrap_or_default();

    if let Some(subtotal) = receipt.subtotal {
        let gap = (items_sum - subtotal).abs();
        if gap > tolerances.subtotal {
            receipt.warnings.push(format!(
                "Items add up to ${} but the receipt subtotal is ${} (off by ${}).",
                items_sum, subtotal, gap
            ));
        }
    }

    match (receipt.subtotal, receipt.total) {
        (Some(subtotal), Some(total)) => {
            let expected = subtotal + extras;
            let gap = (expected - total).abs();
            if gap > tolerances.total {
                receipt.warnings.push(format!(
                    "Subtotal + tax + tip is ${} but the receipt total is ${} (off by ${}).",
                    expected, total, gap
                ));
            }
        }
        (Some(subtotal), None) => {
            let computed: Money = subtotal + extras;
            receipt.total = Some(computed);
            receipt.warnings.push(format!(
                "No total was detected; ${} was computed from subtotal, tax and tip.",
                computed
            ));
        }
        _ => {}
    }

    if receipt.items.is_empty() {
        receipt.warnings.push(
            "No line items were detected. Please add or correct the items manually.".to_string(),
        );
    }
}
