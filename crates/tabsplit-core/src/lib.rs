//! tabsplit Core Library
//!
//! Turns recognized receipt text into a structured record and splits its
//! costs among participants:
//! - Exact integer-cents `Money`
//! - Configurable keyword/pattern rule tables
//! - Rule-based receipt parser (normalize, classify, totals, items, sanity)
//! - Proportional allocation engine with exact reconciliation
//!
//! Everything here is pure and synchronous. Text recognition, editing,
//! persistence and rendering are handled by callers.

pub mod allocation;
pub mod error;
pub mod models;
pub mod money;
pub mod parser;
pub mod rules;

pub use allocation::{compute_allocation, AllocationResult, PersonRow};
pub use error::{Error, Result};
pub use models::{Assignments, ParsedReceipt, Participant, Receipt, ReceiptItem};
pub use money::Money;
pub use parser::{parse_receipt, LineKind, ReceiptParser};
pub use rules::{RuleSet, RuleSource};
