//! Wallet ledger: the purchase admission rules for student wallets.
//!
//! Every function here is pure and synchronous. A checkout is admitted only
//! when the card is active, the cart is non-empty, the wallet covers the total
//! and the store's weekly cap is not exceeded. Rejected checkouts leave the
//! student untouched; accepted ones update balance and weekly spend together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::StoreCategory;
use thiserror::Error;

use super::models::{Cart, Student, Transaction, TransactionKind};
use super::receipt::ReceiptNumbering;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("Card is inactive")]
    InactiveCard,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Insufficient balance: wallet has {balance}, cart total is {total}")]
    InsufficientBalance { balance: Decimal, total: Decimal },
    #[error("Weekly {category} spending limit exceeded: {remaining} remaining")]
    SpendingLimitExceeded {
        category: StoreCategory,
        remaining: Decimal,
    },
    #[error("No student found for card {card_number}")]
    StudentNotFound { card_number: String },
    #[error("Invalid cart line {item_id}: {reason}")]
    InvalidCartLine { item_id: String, reason: String },
    #[error("Cart total is too large")]
    AmountOverflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RechargeError {
    #[error("Recharge amount must be greater than 0")]
    NonPositiveAmount,
    #[error("Recharge amount exceeds the maximum of {max}")]
    AmountTooLarge { max: Decimal },
    #[error("Recharge would overflow the wallet balance")]
    BalanceOverflow,
}

/// Headroom left in the weekly cap for `category`, never negative.
pub fn remaining_limit(student: &Student, category: StoreCategory) -> Decimal {
    let remaining = student.weekly_limit(category) - student.spent_this_week(category);
    remaining.max(Decimal::ZERO)
}

/// Whether a purchase of `cart_total` in `category` would be admitted.
pub fn can_checkout(student: &Student, category: StoreCategory, cart_total: Decimal) -> bool {
    admission_check(student, category, cart_total).is_ok()
}

/// Validate every cart line and compute the cart total.
///
/// Runs before any admission rule, so a malformed or oversized cart is
/// reported as such regardless of the card's state.
pub fn cart_total(cart: &Cart) -> Result<Decimal, CheckoutError> {
    validate_cart_lines(cart)?;
    cart.total().ok_or(CheckoutError::AmountOverflow)
}

/// Validate and apply a purchase.
///
/// On success the student's balance, weekly spend and last transaction time
/// are updated and the purchase record is returned. On failure the student
/// is left exactly as it was.
pub fn checkout<R>(
    student: &mut Student,
    category: StoreCategory,
    cart: &Cart,
    timestamp: DateTime<Utc>,
    receipts: &R,
) -> Result<Transaction, CheckoutError>
where
    R: ReceiptNumbering + ?Sized,
{
    let cart_total = cart_total(cart)?;
    admission_check(student, category, cart_total)?;

    let new_balance = student.wallet_balance - cart_total;
    let new_week_spend = student.spent_this_week(category) + cart_total;

    student.wallet_balance = new_balance;
    student.current_week_spending.set(category, new_week_spend);
    student.last_transaction_at = Some(timestamp);

    let kind = TransactionKind::Purchase { category };
    Ok(Transaction {
        id: Transaction::generate_id(&kind),
        student_id: student.id.clone(),
        kind,
        amount: cart_total,
        lines: cart.lines.clone(),
        timestamp,
        balance_after: new_balance,
        receipt_id: receipts.next_receipt_id(timestamp),
    })
}

/// Linear lookup of a student by card number. Card numbers are compared as
/// opaque strings.
pub fn find_by_card<'a>(students: &'a [Student], card_number: &str) -> Result<&'a Student, CheckoutError> {
    students
        .iter()
        .find(|student| student.card_number == card_number)
        .ok_or_else(|| CheckoutError::StudentNotFound {
            card_number: card_number.to_string(),
        })
}

/// Add funds to a wallet. No spending-limit checks apply to recharges.
pub fn recharge(student: &Student, amount: Decimal) -> Result<Student, RechargeError> {
    if amount <= Decimal::ZERO {
        return Err(RechargeError::NonPositiveAmount);
    }
    let mut updated = student.clone();
    updated.wallet_balance = student
        .wallet_balance
        .checked_add(amount)
        .ok_or(RechargeError::BalanceOverflow)?;
    Ok(updated)
}

/// Zero the running weekly spend. When this runs is up to the caller.
pub fn reset_weekly_spending(student: &mut Student) {
    for category in StoreCategory::ALL {
        student.current_week_spending.set(category, Decimal::ZERO);
    }
}

// Rules are checked in a fixed order so the reported error is deterministic.
fn admission_check(
    student: &Student,
    category: StoreCategory,
    cart_total: Decimal,
) -> Result<(), CheckoutError> {
    if !student.is_active {
        return Err(CheckoutError::InactiveCard);
    }
    if cart_total <= Decimal::ZERO {
        return Err(CheckoutError::EmptyCart);
    }
    if cart_total > student.wallet_balance {
        return Err(CheckoutError::InsufficientBalance {
            balance: student.wallet_balance,
            total: cart_total,
        });
    }
    // A sum too large to represent is over any limit
    match student.spent_this_week(category).checked_add(cart_total) {
        Some(week_spend) if week_spend <= student.weekly_limit(category) => Ok(()),
        _ => Err(CheckoutError::SpendingLimitExceeded {
            category,
            remaining: remaining_limit(student, category),
        }),
    }
}

fn validate_cart_lines(cart: &Cart) -> Result<(), CheckoutError> {
    for line in &cart.lines {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidCartLine {
                item_id: line.item_id.clone(),
                reason: "quantity must be at least 1".to_string(),
            });
        }
        if line.unit_price < Decimal::ZERO {
            return Err(CheckoutError::InvalidCartLine {
                item_id: line.item_id.clone(),
                reason: "unit price cannot be negative".to_string(),
            });
        }
    }
    Ok(())
}
