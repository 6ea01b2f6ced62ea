//! CSV export of wallet transactions for the reports screen.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use super::formatting::category_label;
use super::models::{Student, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub csv_content: String,
    pub filename: String,
    pub transaction_count: usize,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    receipt_id: &'a str,
    date: String,
    student: &'a str,
    class: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    store: String,
    amount: String,
    balance_after: String,
}

#[derive(Clone, Default)]
pub struct ExportService {}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Render transactions as CSV, oldest first. Students missing from
    /// `students` are exported with an empty name and class.
    pub fn export_transactions_csv(
        &self,
        transactions: &[Transaction],
        students: &[Student],
        generated_at: DateTime<Utc>,
    ) -> Result<CsvExport> {
        let by_id: HashMap<&str, &Student> = students.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut writer = csv::Writer::from_writer(Vec::new());
        for transaction in &ordered {
            let student = by_id.get(transaction.student_id.as_str());
            writer
                .serialize(ExportRow {
                    receipt_id: &transaction.receipt_id,
                    date: transaction.timestamp.format("%Y/%m/%d %H:%M").to_string(),
                    student: student.map(|s| s.name.as_str()).unwrap_or(""),
                    class: student.map(|s| s.class_name.as_str()).unwrap_or(""),
                    kind: transaction.kind.label(),
                    store: transaction.store_category().map(category_label).unwrap_or_default(),
                    amount: format!("{:.2}", transaction.amount),
                    balance_after: format!("{:.2}", transaction.balance_after),
                })
                .with_context(|| format!("Failed to write transaction {}", transaction.id))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV export: {}", e.error()))?;
        let mut csv_content = String::from_utf8(bytes).context("CSV export is not valid UTF-8")?;
        if ordered.is_empty() {
            csv_content = Self::header_line();
        }

        let filename = format!("transactions_{}.csv", generated_at.format("%Y%m%d"));
        info!("Exported {} transactions to {}", ordered.len(), filename);

        Ok(CsvExport {
            csv_content,
            filename,
            transaction_count: ordered.len(),
        })
    }

    // csv only writes the header alongside the first record
    fn header_line() -> String {
        "receipt_id,date,student,class,type,store,amount,balance_after\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TransactionKind;
    use crate::storage::fixtures::mock_students;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use shared::StoreCategory;

    fn transaction(student_id: &str, kind: TransactionKind, amount: Decimal, hour: u32) -> Transaction {
        Transaction {
            id: format!("tx-{}", hour),
            student_id: student_id.to_string(),
            kind,
            amount,
            lines: Vec::new(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 14, hour, 5, 0).unwrap(),
            balance_after: dec!(420),
            receipt_id: format!("RCP-{}", hour),
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_export_transactions_csv() {
        let service = ExportService::new();
        let transactions = vec![
            transaction("student::1", TransactionKind::Recharge, dec!(100), 12),
            transaction(
                "student::3",
                TransactionKind::Purchase { category: StoreCategory::DryFoodShop },
                dec!(30),
                9,
            ),
        ];

        let export = service
            .export_transactions_csv(&transactions, &mock_students(), generated_at())
            .unwrap();

        let lines: Vec<&str> = export.csv_content.lines().collect();
        assert_eq!(lines[0], "receipt_id,date,student,class,type,store,amount,balance_after");
        assert_eq!(
            lines[1],
            "RCP-9,2026/10/14 09:05,Liam van der Merwe,Grade 10C,purchase,Dry Food Shop,30.00,420.00"
        );
        assert_eq!(lines[2], "RCP-12,2026/10/14 12:05,Thabo Nkosi,Grade 8A,recharge,,100.00,420.00");
        assert_eq!(export.transaction_count, 2);
        assert_eq!(export.filename, "transactions_20261018.csv");
    }

    #[test]
    fn test_export_quotes_fields_with_commas() {
        let service = ExportService::new();
        let mut students = mock_students();
        students[0].name = "Nkosi, Thabo".to_string();
        let transactions = vec![transaction("student::1", TransactionKind::Recharge, dec!(5), 8)];

        let export = service
            .export_transactions_csv(&transactions, &students, generated_at())
            .unwrap();

        assert!(export.csv_content.contains("\"Nkosi, Thabo\""));
    }

    #[test]
    fn test_export_unknown_student_and_empty() {
        let service = ExportService::new();

        let export = service
            .export_transactions_csv(
                &[transaction("student::gone", TransactionKind::Recharge, dec!(5), 8)],
                &[],
                generated_at(),
            )
            .unwrap();
        assert!(export.csv_content.lines().nth(1).unwrap().starts_with("RCP-8,2026/10/14 08:05,,,recharge"));

        let empty = service.export_transactions_csv(&[], &[], generated_at()).unwrap();
        assert_eq!(empty.transaction_count, 0);
        assert_eq!(empty.csv_content.lines().count(), 1);
    }
}
