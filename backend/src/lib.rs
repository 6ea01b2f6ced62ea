//! # Tuck-shop backend
//!
//! Non-UI logic for the school RFID-card point of sale.
//!
//! ```text
//! UI (POS, student ledger, reports)
//!     ↓
//! IO layer (request/response DTOs, error tags)
//!     ↓
//! Domain layer (wallet ledger, services)
//!     ↓
//! Storage layer (in-memory repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;
use tracing::info;

use crate::config::PosConfig;
use crate::domain::{ExportService, PosService, ReportService, StudentService, TimestampReceipts, WriteLock};
use crate::storage::Connection;

/// Services shared by every screen
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub connection: C,
    pub pos_service: PosService<C>,
    pub student_service: StudentService<C>,
    pub report_service: ReportService<C>,
    pub export_service: ExportService,
    pub currency_symbol: String,
}

/// Wire up all services over one storage connection
pub fn initialize_backend<C: Connection>(connection: C, config: &PosConfig) -> AppState<C> {
    info!("Setting up domain services");
    let receipts = Arc::new(TimestampReceipts::new(config.receipt_prefix.clone()));
    // One writer per process across every service that rewrites students
    let write_lock = WriteLock::new();
    let pos_service = PosService::new(&connection, receipts, config.max_recharge_amount, write_lock.clone());
    let student_service = StudentService::new(&connection, config.default_weekly_limits, write_lock);
    let report_service = ReportService::new(&connection);
    let export_service = ExportService::new();

    info!("Setting up application state");
    AppState {
        connection,
        pos_service,
        student_service,
        report_service,
        export_service,
        currency_symbol: config.currency_symbol.clone(),
    }
}
