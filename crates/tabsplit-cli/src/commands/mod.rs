//! CLI command implementations
//!
//! Commands are organized by workflow step:
//! - `parse` - Parse recognized lines into a draft receipt
//! - `draft` - Build a finalized receipt with participants and assignments
//! - `split` - Allocation report for a finalized receipt
//! - `rules` - Rule table inspection

pub mod draft;
pub mod parse;
pub mod rules;
pub mod split;

// Re-export command functions for main.rs
pub use draft::*;
pub use parse::*;
pub use rules::*;
pub use split::*;

use std::path::Path;

use anyhow::{Context, Result};
use tabsplit_core::RuleSet;

/// Resolve rules: explicit path, else the default override location
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let rules = match path {
        Some(path) => RuleSet::with_rules_path(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => RuleSet::load().context("Failed to load rules")?,
    };
    tracing::debug!("Using rules from {}", rules.source);
    Ok(rules)
}

/// Read recognized lines from a text file, one per line
pub fn read_lines(file: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
