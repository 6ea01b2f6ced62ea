//! Domain model for a wallet transaction.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::StoreCategory;

use super::cart::CartLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase { category: StoreCategory },
    Recharge,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Purchase { .. } => "purchase",
            TransactionKind::Recharge => "recharge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub student_id: String,
    pub kind: TransactionKind,
    /// Always positive; `kind` decides whether it left or entered the wallet
    pub amount: Decimal,
    pub lines: Vec<CartLine>,
    pub timestamp: DateTime<Utc>,
    pub balance_after: Decimal,
    pub receipt_id: String,
}

impl Transaction {
    /// Generate a unique transaction ID.
    /// Format: `<purchase|recharge>::<uuid>`
    pub fn generate_id(kind: &TransactionKind) -> String {
        format!("{}::{}", kind.label(), uuid::Uuid::new_v4())
    }

    pub fn store_category(&self) -> Option<StoreCategory> {
        match self.kind {
            TransactionKind::Purchase { category } => Some(category),
            TransactionKind::Recharge => None,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }
}
