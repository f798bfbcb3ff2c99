//! Draft a finalized receipt from recognized lines
//!
//! Stands in for the interactive confirmation step: every detected item is
//! shared by every listed participant. The JSON can be edited by hand before
//! running `split`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tabsplit_core::{ParsedReceipt, Participant, Receipt, RuleSet};
use tracing::info;
use uuid::Uuid;

use super::parse_file;

/// Build a receipt with every item assigned to all of `people`
pub fn build_draft(
    parsed: &ParsedReceipt,
    people: &[String],
    display_name: &str,
) -> Result<Receipt> {
    let names: Vec<&str> = people
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if names.is_empty() {
        bail!("At least one participant name is required");
    }

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.to_lowercase()) {
            bail!("Participant '{}' is listed more than once", name);
        }
    }

    let mut receipt = Receipt::from_parsed(parsed, display_name);
    receipt.participants = names.into_iter().map(Participant::new).collect();

    let participant_ids: Vec<Uuid> = receipt.participants.iter().map(|p| p.id).collect();
    let item_ids: Vec<Uuid> = receipt.items.iter().map(|i| i.id).collect();
    for item_id in item_ids {
        for participant_id in &participant_ids {
            receipt.assign(item_id, *participant_id);
        }
    }

    Ok(receipt)
}

pub fn cmd_draft(
    rules: RuleSet,
    file: &Path,
    people: &[String],
    name: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let parsed = parse_file(rules, file)?;

    let display_name = name
        .map(str::to_string)
        .or_else(|| parsed.merchant_name.clone())
        .or_else(|| file.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "Receipt".to_string());

    let receipt = build_draft(&parsed, people, &display_name)?;
    let json = serde_json::to_string_pretty(&receipt).context("Failed to serialize receipt")?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Drafted '{}' ({} items, {} people) at {}",
                receipt.display_name,
                receipt.items.len(),
                receipt.participants.len(),
                receipt.created_at.format("%Y-%m-%d %H:%M")
            );
            println!("✓ Wrote {}", path.display());
            for warning in &parsed.warnings {
                println!("  ⚠️  {}", warning);
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}
