//! # Domain Module
//!
//! Business rules for the school tuck-shop wallets, independent of any UI
//! or storage backend.
//!
//! - **wallet_ledger**: purchase admission, balance and weekly-limit updates
//! - **receipt**: pluggable receipt numbering
//! - **pos_service**: checkout and recharge against storage
//! - **student_service**: card lookup, registration, weekly reset
//! - **report_service**: student ledger and dashboard summary
//! - **export_service**: CSV export of transactions
//! - **formatting**: labels and currency strings for display
//! - **write_lock**: the single-writer lock shared by mutating services

pub mod export_service;
pub mod formatting;
pub mod models;
pub mod pos_service;
pub mod receipt;
pub mod report_service;
pub mod student_service;
pub mod wallet_ledger;
pub mod write_lock;

pub use export_service::*;
pub use pos_service::*;
pub use receipt::*;
pub use report_service::*;
pub use student_service::*;
pub use wallet_ledger::{CheckoutError, RechargeError};
pub use write_lock::WriteLock;
