//! Receipt parsing command

use std::path::Path;

use anyhow::{Context, Result};
use tabsplit_core::{Money, ParsedReceipt, ReceiptParser, RuleSet};

use super::{read_lines, truncate};

/// Parse a file of recognized lines with the given rules
pub fn parse_file(rules: RuleSet, file: &Path) -> Result<ParsedReceipt> {
    let lines = read_lines(file)?;
    let full_text = lines.join("\n");
    Ok(ReceiptParser::new(rules).parse(&lines, &full_text))
}

pub fn cmd_parse(rules: RuleSet, file: &Path, json: bool) -> Result<()> {
    let parsed = parse_file(rules, file)?;

    if json {
        let out = serde_json::to_string_pretty(&parsed).context("Failed to serialize receipt")?;
        println!("{}", out);
        return Ok(());
    }

    print_parsed(&parsed);
    Ok(())
}

fn amount_or_na(amount: Option<Money>) -> String {
    amount
        .map(|a| format!("${}", a))
        .unwrap_or_else(|| "N/A".to_string())
}

fn print_parsed(parsed: &ParsedReceipt) {
    println!();
    println!(
        "🧾 {}",
        parsed.merchant_name.as_deref().unwrap_or("Unknown merchant")
    );
    println!("   ─────────────────────────────────────────────");

    if parsed.items.is_empty() {
        println!("   (no items detected)");
    } else {
        for item in &parsed.items {
            println!("   {:<32} {:>10}", truncate(&item.name, 32), format!("${}", item.amount));
        }
        println!("   ─────────────────────────────────────────────");
        println!("   {:<32} {:>10}", "Items", format!("${}", parsed.items_sum()));
    }

    println!("   {:<32} {:>10}", "Subtotal", amount_or_na(parsed.subtotal));
    println!("   {:<32} {:>10}", "Tax + fees", amount_or_na(parsed.tax));
    println!("   {:<32} {:>10}", "Tip", amount_or_na(parsed.tip));
    println!("   {:<32} {:>10}", "Total", amount_or_na(parsed.total));

    if !parsed.warnings.is_empty() {
        println!();
        for warning in &parsed.warnings {
            println!("   ⚠️  {}", warning);
        }
    }
    println!();
}
