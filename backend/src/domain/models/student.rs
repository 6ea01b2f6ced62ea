//! Domain model for a student wallet holder.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{SpendingLimits, StoreCategory};

/// A student with an RFID card linked to a stored-value wallet.
///
/// `wallet_balance` and `current_week_spending` are only changed by the
/// wallet ledger, and only as the effect of an accepted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub card_number: String,
    pub wallet_balance: Decimal,
    pub is_active: bool,
    pub weekly_spending_limits: SpendingLimits,
    pub current_week_spending: SpendingLimits,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Generate a unique student ID.
    /// Format: `student::<uuid>`
    pub fn generate_id() -> String {
        format!("student::{}", uuid::Uuid::new_v4())
    }

    pub fn spent_this_week(&self, category: StoreCategory) -> Decimal {
        self.current_week_spending.get(category)
    }

    pub fn weekly_limit(&self, category: StoreCategory) -> Decimal {
        self.weekly_spending_limits.get(category)
    }
}
