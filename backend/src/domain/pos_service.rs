//! POS checkout and wallet recharge orchestration.
//!
//! Wraps the wallet ledger with storage: look the student up by card, run the
//! ledger against a copy, then commit the updated student and the
//! transaction record in one storage write. Every balance-changing call holds
//! the shared [`WriteLock`] for the whole read-validate-write cycle, so two
//! checkouts for the same card can never interleave.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::StoreCategory;
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{Cart, Student, Transaction, TransactionKind};
use super::receipt::ReceiptNumbering;
use super::wallet_ledger::{self, CheckoutError, RechargeError};
use super::write_lock::WriteLock;
use crate::storage::{Connection, StudentStorage, TransactionStorage};

/// Outcome of a pre-flight check before the cashier confirms a sale
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutQuote {
    pub student: Student,
    pub total: Decimal,
    pub remaining_limit: Decimal,
    pub can_checkout: bool,
}

/// Result of a successful checkout or recharge
#[derive(Debug, Clone, PartialEq)]
pub struct PosReceipt {
    pub student: Student,
    pub transaction: Transaction,
}

#[derive(Clone)]
pub struct PosService<C: Connection> {
    student_repository: Arc<C::StudentRepository>,
    transaction_repository: Arc<C::TransactionRepository>,
    receipts: Arc<dyn ReceiptNumbering + Send + Sync>,
    max_recharge_amount: Decimal,
    write_lock: WriteLock,
}

impl<C: Connection> PosService<C> {
    pub fn new(
        connection: &C,
        receipts: Arc<dyn ReceiptNumbering + Send + Sync>,
        max_recharge_amount: Decimal,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            student_repository: Arc::new(connection.create_student_repository()),
            transaction_repository: Arc::new(connection.create_transaction_repository()),
            receipts,
            max_recharge_amount,
            write_lock,
        }
    }

    /// Check a cart against the card holder's wallet without changing anything
    pub fn quote(&self, card_number: &str, category: StoreCategory, cart: &Cart) -> Result<CheckoutQuote> {
        let total = wallet_ledger::cart_total(cart)?;
        let student = self.lookup(card_number)?;
        Ok(CheckoutQuote {
            can_checkout: wallet_ledger::can_checkout(&student, category, total),
            remaining_limit: wallet_ledger::remaining_limit(&student, category),
            total,
            student,
        })
    }

    pub fn checkout(&self, card_number: &str, category: StoreCategory, cart: &Cart) -> Result<PosReceipt> {
        let total = match wallet_ledger::cart_total(cart) {
            Ok(total) => total,
            Err(err) => {
                warn!("Checkout rejected for card {}: {}", card_number, err);
                return Err(err.into());
            }
        };

        let _guard = self.write_lock.acquire();

        let mut student = self.lookup(card_number)?;
        info!(
            "Checkout for {} at {}: {} lines, total {}",
            student.id,
            category,
            cart.lines.len(),
            total
        );

        let transaction = match wallet_ledger::checkout(
            &mut student,
            category,
            cart,
            Utc::now(),
            self.receipts.as_ref(),
        ) {
            Ok(transaction) => transaction,
            Err(err) => {
                warn!("Checkout rejected for {}: {}", student.id, err);
                return Err(err.into());
            }
        };

        self.transaction_repository.record_transaction(&student, &transaction)?;

        info!(
            "Checkout accepted: receipt {} for {}, balance now {}",
            transaction.receipt_id, student.id, student.wallet_balance
        );
        Ok(PosReceipt { student, transaction })
    }

    /// Add funds to a wallet. Works for blocked cards too.
    pub fn recharge(&self, card_number: &str, amount: Decimal) -> Result<PosReceipt> {
        if amount > self.max_recharge_amount {
            warn!("Recharge of {} above maximum {}", amount, self.max_recharge_amount);
            return Err(RechargeError::AmountTooLarge {
                max: self.max_recharge_amount,
            }
            .into());
        }

        let _guard = self.write_lock.acquire();

        let student = self.lookup(card_number)?;
        let updated = wallet_ledger::recharge(&student, amount)?;

        let timestamp = Utc::now();
        let kind = TransactionKind::Recharge;
        let transaction = Transaction {
            id: Transaction::generate_id(&kind),
            student_id: updated.id.clone(),
            kind,
            amount,
            lines: Vec::new(),
            timestamp,
            balance_after: updated.wallet_balance,
            receipt_id: self.receipts.next_receipt_id(timestamp),
        };

        self.transaction_repository.record_transaction(&updated, &transaction)?;

        info!(
            "Recharged {} for {}, balance now {}",
            amount, updated.id, updated.wallet_balance
        );
        Ok(PosReceipt {
            student: updated,
            transaction,
        })
    }

    fn lookup(&self, card_number: &str) -> Result<Student> {
        let students = self.student_repository.list_students()?;
        match wallet_ledger::find_by_card(&students, card_number) {
            Ok(student) => Ok(student.clone()),
            Err(err) => {
                warn!("Card lookup failed: {}", card_number);
                Err(err.into())
            }
        }
    }
}

/// Extract the ledger rejection from a service error, if that is what it was
pub fn checkout_error(err: &anyhow::Error) -> Option<&CheckoutError> {
    err.downcast_ref::<CheckoutError>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CartLine;
    use crate::domain::receipt::TimestampReceipts;
    use crate::storage::fixtures::mock_students;
    use crate::storage::MemoryConnection;
    use rust_decimal_macros::dec;
    use std::thread;

    fn create_test_service() -> (PosService<MemoryConnection>, MemoryConnection) {
        let connection = MemoryConnection::with_students(mock_students());
        let service = PosService::new(
            &connection,
            Arc::new(TimestampReceipts::new("RCP")),
            dec!(1000),
            WriteLock::new(),
        );
        (service, connection)
    }

    fn cart(lines: &[(&str, Decimal, u32)]) -> Cart {
        Cart::new(
            lines
                .iter()
                .map(|(name, price, quantity)| CartLine {
                    item_id: name.to_lowercase().replace(' ', "-"),
                    item_name: name.to_string(),
                    unit_price: *price,
                    quantity: *quantity,
                    category: StoreCategory::TuckShop,
                })
                .collect(),
        )
    }

    fn stored_student(connection: &MemoryConnection, id: &str) -> Student {
        connection.create_student_repository().get_student(id).unwrap().unwrap()
    }

    #[test]
    fn test_checkout_persists_student_and_transaction() {
        let (service, connection) = create_test_service();
        let cart = cart(&[("Meat pie", dec!(12.50), 2), ("Juice", dec!(5), 1)]);

        let receipt = service.checkout("RFID-0001", StoreCategory::TuckShop, &cart).unwrap();

        assert_eq!(receipt.student.wallet_balance, dec!(420));
        assert_eq!(receipt.transaction.balance_after, dec!(420));
        assert!(receipt.transaction.receipt_id.starts_with("RCP-"));

        let stored = stored_student(&connection, "student::1");
        assert_eq!(stored.wallet_balance, dec!(420));
        assert_eq!(stored.current_week_spending.tuck_shop, dec!(115));
        assert!(stored.last_transaction_at.is_some());

        let transactions = connection
            .create_transaction_repository()
            .list_transactions_for_student("student::1")
            .unwrap();
        assert_eq!(transactions, vec![receipt.transaction]);
    }

    #[test]
    fn test_rejected_checkout_persists_nothing() {
        let (service, connection) = create_test_service();
        let before = stored_student(&connection, "student::1");

        let err = service
            .checkout("RFID-0001", StoreCategory::TuckShop, &cart(&[("Hamper", dec!(70), 1)]))
            .unwrap_err();

        assert_eq!(
            checkout_error(&err),
            Some(&CheckoutError::SpendingLimitExceeded {
                category: StoreCategory::TuckShop,
                remaining: dec!(65),
            })
        );
        assert_eq!(stored_student(&connection, "student::1"), before);
        assert!(connection
            .create_transaction_repository()
            .list_all_transactions()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_checkout_unknown_card() {
        let (service, _) = create_test_service();

        let err = service
            .checkout("RFID-9999", StoreCategory::TuckShop, &cart(&[("Chips", dec!(8), 1)]))
            .unwrap_err();

        assert!(matches!(checkout_error(&err), Some(CheckoutError::StudentNotFound { .. })));
    }

    #[test]
    fn test_checkout_blocked_card() {
        let (service, _) = create_test_service();

        let err = service
            .checkout("RFID-0004", StoreCategory::TuckShop, &cart(&[("Chips", dec!(8), 1)]))
            .unwrap_err();

        assert_eq!(checkout_error(&err), Some(&CheckoutError::InactiveCard));
    }

    #[test]
    fn test_quote_does_not_mutate() {
        let (service, connection) = create_test_service();
        let before = stored_student(&connection, "student::1");

        let quote = service
            .quote("RFID-0001", StoreCategory::TuckShop, &cart(&[("Hamper", dec!(70), 1)]))
            .unwrap();

        assert!(!quote.can_checkout);
        assert_eq!(quote.total, dec!(70));
        assert_eq!(quote.remaining_limit, dec!(65));
        assert_eq!(stored_student(&connection, "student::1"), before);
    }

    #[test]
    fn test_recharge_records_transaction() {
        let (service, connection) = create_test_service();

        let receipt = service.recharge("RFID-0004", dec!(50)).unwrap();

        assert_eq!(receipt.student.wallet_balance, dec!(350));
        assert_eq!(receipt.transaction.kind, TransactionKind::Recharge);
        assert_eq!(receipt.transaction.store_category(), None);
        assert_eq!(stored_student(&connection, "student::4").wallet_balance, dec!(350));
    }

    #[test]
    fn test_recharge_rejects_bad_amounts() {
        let (service, connection) = create_test_service();

        let err = service.recharge("RFID-0001", Decimal::ZERO).unwrap_err();
        assert_eq!(err.downcast_ref::<RechargeError>(), Some(&RechargeError::NonPositiveAmount));

        let err = service.recharge("RFID-0001", dec!(1000.01)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RechargeError>(),
            Some(&RechargeError::AmountTooLarge { max: dec!(1000) })
        );

        assert_eq!(stored_student(&connection, "student::1").wallet_balance, dec!(450));
    }

    #[test]
    fn test_concurrent_checkouts_respect_limit() {
        let (service, connection) = create_test_service();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                thread::spawn(move || {
                    service
                        .checkout("RFID-0001", StoreCategory::TuckShop, &cart(&[("Muffin", dec!(10), 1)]))
                        .is_ok()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // 85 already spent against a 150 cap leaves room for six R10 muffins
        assert_eq!(accepted, 6);
        let stored = stored_student(&connection, "student::1");
        assert_eq!(stored.current_week_spending.tuck_shop, dec!(145));
        assert_eq!(stored.wallet_balance, dec!(390));
    }

    #[test]
    fn test_overflowing_cart_leaves_pos_usable() {
        let (service, connection) = create_test_service();

        let worker = service.clone();
        let outcome = thread::spawn(move || {
            worker.checkout("RFID-0001", StoreCategory::TuckShop, &cart(&[("Gold bar", Decimal::MAX, 2)]))
        })
        .join()
        .expect("checkout thread should not panic");
        assert_eq!(
            checkout_error(&outcome.unwrap_err()),
            Some(&CheckoutError::AmountOverflow)
        );

        let receipt = service
            .checkout("RFID-0001", StoreCategory::TuckShop, &cart(&[("Juice", dec!(10), 1)]))
            .unwrap();
        assert_eq!(receipt.student.wallet_balance, dec!(440));
        assert_eq!(stored_student(&connection, "student::1").wallet_balance, dec!(440));
    }

    #[test]
    fn test_quote_rejects_overflowing_cart() {
        let (service, _) = create_test_service();

        let err = service
            .quote("RFID-0001", StoreCategory::TuckShop, &cart(&[("Gold bar", Decimal::MAX, 2)]))
            .unwrap_err();

        assert_eq!(checkout_error(&err), Some(&CheckoutError::AmountOverflow));
    }
}
