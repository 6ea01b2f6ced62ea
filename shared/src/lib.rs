use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store a purchase is made in. Weekly spending caps are tracked per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreCategory {
    TuckShop,
    DryFoodShop,
    GeneralStore,
}

impl StoreCategory {
    pub const ALL: [StoreCategory; 3] = [
        StoreCategory::TuckShop,
        StoreCategory::DryFoodShop,
        StoreCategory::GeneralStore,
    ];

    /// Key used in fixtures, config files and CSV exports (e.g. `tuckShop`)
    pub fn key(&self) -> &'static str {
        match self {
            StoreCategory::TuckShop => "tuckShop",
            StoreCategory::DryFoodShop => "dryFoodShop",
            StoreCategory::GeneralStore => "generalStore",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One amount per store category. Also used for the running weekly spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpendingLimits {
    pub tuck_shop: Decimal,
    pub dry_food_shop: Decimal,
    pub general_store: Decimal,
}

impl SpendingLimits {
    pub fn new(tuck_shop: Decimal, dry_food_shop: Decimal, general_store: Decimal) -> Self {
        Self {
            tuck_shop,
            dry_food_shop,
            general_store,
        }
    }

    pub fn get(&self, category: StoreCategory) -> Decimal {
        match category {
            StoreCategory::TuckShop => self.tuck_shop,
            StoreCategory::DryFoodShop => self.dry_food_shop,
            StoreCategory::GeneralStore => self.general_store,
        }
    }

    pub fn get_mut(&mut self, category: StoreCategory) -> &mut Decimal {
        match category {
            StoreCategory::TuckShop => &mut self.tuck_shop,
            StoreCategory::DryFoodShop => &mut self.dry_food_shop,
            StoreCategory::GeneralStore => &mut self.general_store,
        }
    }

    pub fn set(&mut self, category: StoreCategory, amount: Decimal) {
        *self.get_mut(category) = amount;
    }
}

/// A single line of a POS cart as submitted by the checkout screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineRequest {
    pub item_id: String,
    pub item_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Card number read from the RFID reader
    pub card_number: String,
    pub store: StoreCategory,
    pub lines: Vec<CartLineRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub transaction_id: String,
    pub receipt_id: String,
    pub student_name: String,
    pub total: Decimal,
    pub balance_after: Decimal,
    /// Headroom left in the store's weekly cap after this purchase
    pub remaining_limit: Decimal,
    pub success_message: String,
}

/// Pre-flight check shown on the POS screen before the cashier confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutQuoteResponse {
    pub student_name: String,
    pub total: Decimal,
    pub wallet_balance: Decimal,
    pub remaining_limit: Decimal,
    pub can_checkout: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeRequest {
    pub card_number: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeResponse {
    pub receipt_id: String,
    pub student_name: String,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub success_message: String,
}

/// Student as shown in lists and the student ledger header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub card_number: String,
    pub wallet_balance: Decimal,
    pub is_active: bool,
    pub weekly_spending_limits: SpendingLimits,
    pub current_week_spending: SpendingLimits,
    /// RFC 3339 timestamp of the last accepted transaction
    pub last_transaction_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterStudentRequest {
    pub name: String,
    pub class_name: String,
    pub card_number: String,
    pub opening_balance: Decimal,
    /// Configured defaults apply when omitted
    #[serde(default)]
    pub weekly_spending_limits: Option<SpendingLimits>,
}

/// Block or unblock a student's card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCardStatusRequest {
    pub student_id: String,
    pub is_active: bool,
}

/// A single student after a change made from the admin screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: StudentSummary,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyResetResponse {
    pub students_reset: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<StudentSummary>,
}

/// Row of the student ledger / transaction report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: String,
    pub receipt_id: String,
    pub student_id: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    /// `purchase` or `recharge`
    pub kind: String,
    pub store: Option<StoreCategory>,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub item_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLedgerResponse {
    pub student: StudentSummary,
    pub transactions: Vec<TransactionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummaryResponse {
    /// Day the summary covers (YYYY-MM-DD)
    pub date: String,
    pub purchases_today: u32,
    pub revenue_today: Decimal,
    pub revenue_by_store: SpendingLimits,
    pub total_wallet_balance: Decimal,
    pub active_students: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDataResponse {
    pub csv_content: String,
    pub filename: String,
    pub transaction_count: usize,
}

/// Stable error tags the POS screen switches on to pick a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    InactiveCard,
    EmptyCart,
    InsufficientBalance,
    SpendingLimitExceeded,
    StudentNotFound,
    InvalidRequest,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
