//! Allocation report for a finalized receipt

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{json, Value};
use tabsplit_core::{compute_allocation, AllocationResult, Money, Receipt};

use super::truncate;

pub fn load_receipt(file: &Path) -> Result<Receipt> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Receipt::from_json(&content)
        .with_context(|| format!("{} is not a valid receipt", file.display()))
}

/// JSON view of an allocation, with each row's total spelled out
pub fn allocation_json(receipt: &Receipt, result: &AllocationResult) -> Value {
    let rows: Vec<Value> = result
        .rows
        .iter()
        .map(|row| {
            json!({
                "participant_id": row.participant_id,
                "name": row.name,
                "items": row.items,
                "subtotal": row.subtotal,
                "tax_share": row.tax_share,
                "tip_share": row.tip_share,
                "total": row.total(),
            })
        })
        .collect();

    json!({
        "receipt_id": receipt.id,
        "display_name": receipt.display_name,
        "rows": rows,
        "sum_subtotal": result.sum_subtotal,
        "sum_tax": result.sum_tax,
        "sum_tip": result.sum_tip,
        "sum_total": result.sum_total,
        "unallocated_subtotal": result.unallocated_subtotal,
        "unallocated_tax": result.unallocated_tax,
        "unallocated_tip": result.unallocated_tip,
        "unallocated_total": result.unallocated_total,
        "is_fully_assigned": result.is_fully_assigned,
        "reconciled": result.reconciled,
    })
}

pub fn cmd_split(file: &Path, json: bool) -> Result<()> {
    let receipt = load_receipt(file)?;
    let result = compute_allocation(&receipt);

    if json {
        let out = serde_json::to_string_pretty(&allocation_json(&receipt, &result))
            .context("Failed to serialize allocation")?;
        println!("{}", out);
        return Ok(());
    }

    print_allocation(&receipt, &result);
    Ok(())
}

fn dollars(amount: Money) -> String {
    format!("${}", amount)
}

fn print_allocation(receipt: &Receipt, result: &AllocationResult) {
    println!();
    match &receipt.merchant_name {
        Some(merchant) if merchant != &receipt.display_name => {
            println!("💸 {} ({})", receipt.display_name, merchant)
        }
        _ => println!("💸 {}", receipt.display_name),
    }
    println!(
        "   {}",
        receipt
            .created_at
            .with_timezone(&Local)
            .format("%b %-d, %Y %H:%M")
    );
    println!("{}", "─".repeat(66));
    println!(
        "  {:<20} {:>10} {:>10} {:>10} {:>10}",
        "Name", "Items", "Tax", "Tip", "Total"
    );
    println!("{}", "─".repeat(66));

    for row in &result.rows {
        println!(
            "  {:<20} {:>10} {:>10} {:>10} {:>10}",
            truncate(&row.name, 20),
            dollars(row.subtotal),
            dollars(row.tax_share),
            dollars(row.tip_share),
            dollars(row.total())
        );
        for item in &row.items {
            println!("      {}", item);
        }
    }

    println!("{}", "─".repeat(66));
    println!(
        "  {:<20} {:>10} {:>10} {:>10} {:>10}",
        "Allocated",
        dollars(result.sum_subtotal),
        dollars(result.sum_tax),
        dollars(result.sum_tip),
        dollars(result.sum_total)
    );

    if !result.unallocated_total.is_zero() || !result.unallocated_subtotal.is_zero() {
        println!(
            "  {:<20} {:>10} {:>10} {:>10} {:>10}",
            "Unallocated",
            dollars(result.unallocated_subtotal),
            dollars(result.unallocated_tax),
            dollars(result.unallocated_tip),
            dollars(result.unallocated_total)
        );
    }
    println!();

    if !result.is_fully_assigned {
        let names: Vec<&str> = receipt.unassigned_items().map(|i| i.name.as_str()).collect();
        println!("  ⚠️  Unassigned items: {}", names.join(", "));
    } else if !result.reconciled && !result.rows.is_empty() {
        println!("  ⚠️  Shared items did not divide evenly; the leftover cents are unallocated");
    }

    if let Some(total) = receipt.total {
        if total != result.sum_total {
            println!(
                "  ℹ️  Receipt total is {}; allocated {}",
                dollars(total),
                dollars(result.sum_total)
            );
        }
    }
    println!();
}
