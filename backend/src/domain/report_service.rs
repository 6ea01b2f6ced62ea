//! Student ledger and dashboard figures.
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::SpendingLimits;
use std::sync::Arc;
use tracing::info;

use super::models::{Student, Transaction, TransactionKind};
use crate::storage::{Connection, StudentStorage, TransactionStorage};

#[derive(Debug, Clone, PartialEq)]
pub struct StudentLedger {
    pub student: Student,
    /// Most recent first
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub purchases_today: u32,
    pub revenue_today: Decimal,
    /// All-time purchase revenue per store
    pub revenue_by_store: SpendingLimits,
    pub total_wallet_balance: Decimal,
    pub active_students: u32,
}

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    student_repository: Arc<C::StudentRepository>,
    transaction_repository: Arc<C::TransactionRepository>,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            student_repository: Arc::new(connection.create_student_repository()),
            transaction_repository: Arc::new(connection.create_transaction_repository()),
        }
    }

    pub fn student_ledger(&self, student_id: &str) -> Result<StudentLedger> {
        let student = self
            .student_repository
            .get_student(student_id)?
            .ok_or_else(|| anyhow!("Student not found: {}", student_id))?;
        let transactions = self
            .transaction_repository
            .list_transactions_for_student(student_id)?;
        info!("Ledger for {}: {} transactions", student_id, transactions.len());
        Ok(StudentLedger { student, transactions })
    }

    /// Summary for the dashboard; `date` is compared against UTC timestamps
    pub fn dashboard_summary(&self, date: NaiveDate) -> Result<DashboardSummary> {
        let students = self.student_repository.list_students()?;
        let transactions = self.transaction_repository.list_all_transactions()?;

        let mut purchases_today = 0;
        let mut revenue_today = Decimal::ZERO;
        let mut revenue_by_store = SpendingLimits::default();

        for transaction in &transactions {
            if let TransactionKind::Purchase { category } = transaction.kind {
                *revenue_by_store.get_mut(category) += transaction.amount;
                if transaction.timestamp.date_naive() == date {
                    purchases_today += 1;
                    revenue_today += transaction.amount;
                }
            }
        }

        let summary = DashboardSummary {
            date,
            purchases_today,
            revenue_today,
            revenue_by_store,
            total_wallet_balance: students.iter().map(|s| s.wallet_balance).sum(),
            active_students: students.iter().filter(|s| s.is_active).count() as u32,
        };
        info!(
            "Dashboard for {}: {} purchases, revenue {}",
            date, summary.purchases_today, summary.revenue_today
        );
        Ok(summary)
    }
}
