//! Rule table inspection

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tabsplit_core::rules::default_rules_path;

use super::load_rules;

/// The rules file that would be consulted: explicit path, else the default location
pub fn rules_file(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(default_rules_path)
        .ok_or_else(|| anyhow!("Could not determine a data directory for the rules file"))
}

pub fn cmd_rules(explicit: Option<&Path>, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", rules_file(explicit)?.display());
        return Ok(());
    }

    let rules = load_rules(explicit)?;

    println!();
    println!("📐 Receipt rules");
    println!("   ─────────────────────────────────────────────");
    println!("   Source: {}", rules.source);
    if let Ok(path) = rules_file(explicit) {
        let state = if path.exists() { "present" } else { "not present" };
        println!("   Override file: {} ({})", path.display(), state);
    }
    println!();
    println!("   Totals keywords:   {}", rules.totals_keywords.join(", "));
    println!("   Subtotal:          {}", rules.subtotal_keywords.join(", "));
    println!("   Fees:              {}", rules.fee_keywords.join(", "));
    println!("   Tax:               {}", rules.tax_keywords.join(", "));
    println!("   Tip:               {}", rules.tip_keywords.join(", "));
    println!("   Total:             {}", rules.total_keywords.join(", "));
    println!("   Metadata patterns: {}", rules.metadata_patterns.len());
    println!();
    println!(
        "   Tolerances: subtotal ${}, total ${}",
        rules.tolerances.subtotal, rules.tolerances.total
    );
    println!(
        "   Merchant: first {} lines, at least {} chars, at most {} digits",
        rules.merchant.search_lines, rules.merchant.min_length, rules.merchant.max_digits
    );
    println!("   Max item quantity: {}", rules.max_quantity);
    println!();

    Ok(())
}
