//! Keyword and pattern rule tables
//!
//! The parser never hardcodes which words mean "tax" or which lines are
//! boilerplate. Those tables live in a `RuleSet` owned by the parser.
//!
//! ## Configuration Resolution
//!
//! Rules are loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/tabsplit/config/rules.toml)
//! 2. The embedded defaults (compiled into the binary)
//!
//! Override files may be partial; every missing key keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::money::Money;

/// Embedded default rules (compiled into binary)
const DEFAULT_RULES: &str = include_str!("../../../config/rules.toml");

/// Where a rule set came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Cent-level discrepancies tolerated before a sanity warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerances {
    pub subtotal: Money,
    pub total: Money,
}

/// Heuristics for picking the merchant name out of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerchantRules {
    /// Only the first N lines are considered
    pub search_lines: usize,
    pub min_length: usize,
    /// Maximum number of digit characters in a merchant line
    pub max_digits: usize,
}

/// Immutable rule tables used by the classifier, extractor and item parser
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub totals_keywords: Vec<String>,
    pub subtotal_keywords: Vec<String>,
    pub fee_keywords: Vec<String>,
    pub tax_keywords: Vec<String>,
    pub tip_keywords: Vec<String>,
    pub total_keywords: Vec<String>,
    pub total_exclude_keywords: Vec<String>,
    pub metadata_patterns: Vec<Regex>,
    pub tolerances: Tolerances,
    pub merchant: MerchantRules,
    pub max_quantity: u32,
    pub source: RuleSource,
}

impl RuleSet {
    /// Rules resolved from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_rules(default_rules_path().filter(|p| p.exists()).as_deref())
    }

    /// Rules from an explicit file, layered over the embedded defaults
    ///
    /// Falls back to the defaults when the file does not exist.
    pub fn with_rules_path(path: &Path) -> Result<Self> {
        load_rules(Some(path))
    }

    /// The embedded defaults only
    pub fn builtin() -> Result<Self> {
        let raw = parse_raw(DEFAULT_RULES)?;
        compile(raw, RuleSource::Embedded)
    }

    /// Embedded defaults with `content` layered on top (for testing)
    pub fn from_toml(content: &str) -> Result<Self> {
        let base = parse_raw(DEFAULT_RULES)?;
        let over = parse_raw(content)?;
        compile(base.overlay(over), RuleSource::Embedded)
    }

    pub fn is_totals_line(&self, lowered: &str) -> bool {
        contains_any(lowered, &self.totals_keywords)
    }

    pub fn is_metadata_line(&self, lowered: &str) -> bool {
        self.metadata_patterns.iter().any(|re| re.is_match(lowered))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin().expect("embedded rules.toml is valid")
    }
}

/// True if `lowered` contains any keyword as a substring
pub fn contains_any(lowered: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}

/// Default rules override path
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tabsplit").join("config").join("rules.toml"))
}

/// Load rules (override first, then default)
fn load_rules(override_path: Option<&Path>) -> Result<RuleSet> {
    let base = parse_raw(DEFAULT_RULES)?;

    match override_path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read rules: {}", e)))?;
            let over = parse_raw(&content)?;
            debug!("Loaded rule overrides from {}", path.display());
            compile(base.overlay(over), RuleSource::File(path.to_path_buf()))
        }
        Some(path) => {
            warn!(
                "Rules file {} not found, using embedded defaults",
                path.display()
            );
            compile(base, RuleSource::Embedded)
        }
        None => compile(base, RuleSource::Embedded),
    }
}

/// Raw rules structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawRules {
    keywords: Option<RawKeywords>,
    patterns: Option<RawPatterns>,
    tolerances: Option<RawTolerances>,
    merchant: Option<RawMerchant>,
    items: Option<RawItems>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKeywords {
    totals: Option<Vec<String>>,
    subtotal: Option<Vec<String>>,
    fees: Option<Vec<String>>,
    tax: Option<Vec<String>>,
    tip: Option<Vec<String>>,
    total: Option<Vec<String>>,
    total_exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPatterns {
    metadata: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTolerances {
    subtotal_cents: Option<i64>,
    total_cents: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMerchant {
    search_lines: Option<usize>,
    min_length: Option<usize>,
    max_digits: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawItems {
    max_quantity: Option<u32>,
}

impl RawRules {
    /// Take every key present in `over`, keep `self` for the rest
    fn overlay(self, over: RawRules) -> RawRules {
        let k = self.keywords.unwrap_or_default();
        let ko = over.keywords.unwrap_or_default();
        let p = self.patterns.unwrap_or_default();
        let po = over.patterns.unwrap_or_default();
        let t = self.tolerances.unwrap_or_default();
        let to = over.tolerances.unwrap_or_default();
        let m = self.merchant.unwrap_or_default();
        let mo = over.merchant.unwrap_or_default();
        let i = self.items.unwrap_or_default();
        let io = over.items.unwrap_or_default();

        RawRules {
            keywords: Some(RawKeywords {
                totals: ko.totals.or(k.totals),
                subtotal: ko.subtotal.or(k.subtotal),
                fees: ko.fees.or(k.fees),
                tax: ko.tax.or(k.tax),
                tip: ko.tip.or(k.tip),
                total: ko.total.or(k.total),
                total_exclude: ko.total_exclude.or(k.total_exclude),
            }),
            patterns: Some(RawPatterns {
                metadata: po.metadata.or(p.metadata),
            }),
            tolerances: Some(RawTolerances {
                subtotal_cents: to.subtotal_cents.or(t.subtotal_cents),
                total_cents: to.total_cents.or(t.total_cents),
            }),
            merchant: Some(RawMerchant {
                search_lines: mo.search_lines.or(m.search_lines),
                min_length: mo.min_length.or(m.min_length),
                max_digits: mo.max_digits.or(m.max_digits),
            }),
            items: Some(RawItems {
                max_quantity: io.max_quantity.or(i.max_quantity),
            }),
        }
    }
}

fn parse_raw(content: &str) -> Result<RawRules> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| Error::Config(format!("Missing rules key: {}", key)))
}

fn lowered(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Turn raw rules into a usable rule set, compiling every pattern once
fn compile(raw: RawRules, source: RuleSource) -> Result<RuleSet> {
    let keywords = raw.keywords.unwrap_or_default();
    let patterns = raw.patterns.unwrap_or_default();
    let tolerances = raw.tolerances.unwrap_or_default();
    let merchant = raw.merchant.unwrap_or_default();
    let items = raw.items.unwrap_or_default();

    let metadata_patterns = required(patterns.metadata, "patterns.metadata")?
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(RuleSet {
        totals_keywords: lowered(required(keywords.totals, "keywords.totals")?),
        subtotal_keywords: lowered(required(keywords.subtotal, "keywords.subtotal")?),
        fee_keywords: lowered(required(keywords.fees, "keywords.fees")?),
        tax_keywords: lowered(required(keywords.tax, "keywords.tax")?),
        tip_keywords: lowered(required(keywords.tip, "keywords.tip")?),
        total_keywords: lowered(required(keywords.total, "keywords.total")?),
        total_exclude_keywords: lowered(keywords.total_exclude.unwrap_or_default()),
        metadata_patterns,
        tolerances: Tolerances {
            subtotal: Money::from_cents(required(
                tolerances.subtotal_cents,
                "tolerances.subtotal_cents",
            )?),
            total: Money::from_cents(required(tolerances.total_cents, "tolerances.total_cents")?),
        },
        merchant: MerchantRules {
            search_lines: required(merchant.search_lines, "merchant.search_lines")?,
            min_length: required(merchant.min_length, "merchant.min_length")?,
            max_digits: required(merchant.max_digits, "merchant.max_digits")?,
        },
        max_quantity: required(items.max_quantity, "items.max_quantity")?,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_parse() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(rules.source, RuleSource::Embedded);
        assert_eq!(rules.tolerances.subtotal, Money::from_cents(50));
        assert_eq!(rules.tolerances.total, Money::from_cents(75));
        assert_eq!(rules.max_quantity, 99);
        assert_eq!(rules.tip_keywords, vec!["tip".to_string()]);
        assert!(!rules.metadata_patterns.is_empty());
    }

    #[test]
    fn test_extractor_keywords_are_totals_keywords() {
        // Every extractor keyword must also mark its line as a totals line,
        // otherwise the extractor would never see it.
        let rules = RuleSet::default();
        for kw in rules
            .subtotal_keywords
            .iter()
            .chain(&rules.fee_keywords)
            .chain(&rules.tax_keywords)
            .chain(&rules.tip_keywords)
            .chain(&rules.total_keywords)
        {
            assert!(rules.is_totals_line(kw), "{} is not a totals keyword", kw);
        }
    }

    #[test]
    fn test_fee_keywords_exclude_tip() {
        let rules = RuleSet::default();
        for kw in &rules.fee_keywords {
            assert!(!contains_any(kw, &rules.tip_keywords), "{}", kw);
        }
    }

    #[test]
    fn test_partial_override() {
        let rules = RuleSet::from_toml(
            r#"
[tolerances]
subtotal_cents = 10

[keywords]
tip = ["tip", "propina"]
"#,
        )
        .unwrap();
        assert_eq!(rules.tolerances.subtotal, Money::from_cents(10));
        assert_eq!(rules.tolerances.total, Money::from_cents(75));
        assert_eq!(rules.tip_keywords.len(), 2);
        assert_eq!(rules.tax_keywords, vec!["tax", "sales tax"]);
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let rules = RuleSet::from_toml(
            r#"
[keywords]
tip = ["  TIP "]
"#,
        )
        .unwrap();
        assert_eq!(rules.tip_keywords, vec!["tip".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        let err = RuleSet::from_toml("[keywords\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RuleSet::from_toml(
            r#"
[patterns]
metadata = ["(unclosed"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Regex(_)));
    }

    #[test]
    fn test_missing_override_file_uses_defaults() {
        let rules = RuleSet::with_rules_path(Path::new("/nonexistent/tabsplit/rules.toml")).unwrap();
        assert_eq!(rules.source, RuleSource::Embedded);
    }

    #[test]
    fn test_metadata_patterns() {
        let rules = RuleSet::default();
        for line in [
            "server: maria",
            "check #1042",
            "table 12",
            "guest count: 4",
            "123 main st",
            "brooklyn, ny 11201",
            "austin, tx",
            "10001",
            "01/15/24",
            "7:42 pm",
            "(718) 555-1234",
            "visa 4.00",
            "thank you for dining with us",
        ] {
            assert!(rules.is_metadata_line(line), "{} should be metadata", line);
        }
        for line in [
            "5 coquito 80.00",
            "burger 12.00",
            "12 dr pepper 3.00",
            "2 street tacos 9.00",
            "laptop 12345.00",
        ] {
            assert!(!rules.is_metadata_line(line), "{} should not be metadata", line);
        }
    }
}
