//! Domain models for tabsplit

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::money::Money;

/// A single line item on a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: Uuid,
    pub name: String,
    pub amount: Money,
    /// Recognized line the item was extracted from (audit only)
    #[serde(default)]
    pub original_line: Option<String>,
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            original_line: None,
        }
    }

    pub fn with_source(name: impl Into<String>, amount: Money, line: impl Into<String>) -> Self {
        Self {
            original_line: Some(line.into()),
            ..Self::new(name, amount)
        }
    }
}

/// Best-effort extraction from recognized receipt text
///
/// Every financial field is independently optional; zero is a legitimate
/// detected amount and never stands in for "not found".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub merchant_name: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Option<Money>,
    /// Tax plus service fees / mandatory gratuity
    pub tax: Option<Money>,
    pub tip: Option<Money>,
    pub total: Option<Money>,
    /// Unsegmented recognized text, kept for audit
    pub raw_text: String,
    /// Advisory, human-readable messages
    pub warnings: Vec<String>,
}

impl ParsedReceipt {
    pub fn items_sum(&self) -> Money {
        self.items.iter().map(|i| i.amount).sum()
    }
}

/// Someone sharing the bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Item id -> ids of the participants responsible for it
pub type Assignments = BTreeMap<Uuid, BTreeSet<Uuid>>;

/// A finalized receipt, as produced by the confirmation/editing step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub subtotal: Option<Money>,
    #[serde(default)]
    pub tax: Option<Money>,
    #[serde(default)]
    pub tip: Option<Money>,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub assignments: Assignments,
}

impl Receipt {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            display_name: display_name.into(),
            merchant_name: None,
            items: Vec::new(),
            subtotal: None,
            tax: None,
            tip: None,
            total: None,
            participants: Vec::new(),
            assignments: Assignments::new(),
        }
    }

    /// Start a finalized receipt from parser output, with no participants yet
    pub fn from_parsed(parsed: &ParsedReceipt, display_name: impl Into<String>) -> Self {
        Self {
            merchant_name: parsed.merchant_name.clone(),
            items: parsed.items.clone(),
            subtotal: parsed.subtotal,
            tax: parsed.tax,
            tip: parsed.tip,
            total: parsed.total,
            ..Self::new(display_name)
        }
    }

    /// Read a finalized receipt from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let receipt: Receipt = serde_json::from_str(json)?;
        receipt.validate()?;
        Ok(receipt)
    }

    /// Item and participant ids must be unique, and assignments may only
    /// reference items on this receipt
    pub fn validate(&self) -> Result<()> {
        let mut item_ids = HashSet::new();
        for item in &self.items {
            if !item_ids.insert(item.id) {
                return Err(Error::InvalidData(format!("Duplicate item id {}", item.id)));
            }
        }

        let mut participant_ids = HashSet::new();
        for participant in &self.participants {
            if !participant_ids.insert(participant.id) {
                return Err(Error::InvalidData(format!(
                    "Duplicate participant id {}",
                    participant.id
                )));
            }
        }

        if let Some(item_id) = self.assignments.keys().find(|id| !item_ids.contains(*id)) {
            return Err(Error::InvalidData(format!(
                "Assignment references unknown item {}",
                item_id
            )));
        }

        Ok(())
    }

    pub fn computed_items_sum(&self) -> Money {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Declared subtotal, or the items sum when none was recorded
    pub fn effective_subtotal(&self) -> Money {
        self.subtotal.unwrap_or_else(|| self.computed_items_sum())
    }

    pub fn participant(&self, id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants assigned to an item
    ///
    /// Ids that do not name a participant of this receipt are ignored.
    pub fn assignees(&self, item_id: Uuid) -> Vec<&Participant> {
        self.assignments
            .get(&item_id)
            .map(|ids| ids.iter().filter_map(|id| self.participant(*id)).collect())
            .unwrap_or_default()
    }

    pub fn assign(&mut self, item_id: Uuid, participant_id: Uuid) {
        self.assignments
            .entry(item_id)
            .or_default()
            .insert(participant_id);
    }

    pub fn unassigned_items(&self) -> impl Iterator<Item = &ReceiptItem> + '_ {
        self.items
            .iter()
            .filter(move |item| self.assignees(item.id).is_empty())
    }

    /// True when every item has at least one assignee (vacuously true with no items)
    pub fn is_fully_assigned(&self) -> bool {
        self.unassigned_items().next().is_none()
    }
}
