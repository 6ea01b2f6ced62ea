use rust_decimal::Decimal;
use shared::{CartLineRequest, StoreCategory, TransactionEntry};

use crate::domain::models::{Cart, CartLine, Transaction};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(transaction: &Transaction) -> TransactionEntry {
        TransactionEntry {
            id: transaction.id.clone(),
            receipt_id: transaction.receipt_id.clone(),
            student_id: transaction.student_id.clone(),
            timestamp: transaction.timestamp.to_rfc3339(),
            kind: transaction.kind.label().to_string(),
            store: transaction.store_category(),
            amount: transaction.amount,
            balance_after: transaction.balance_after,
            item_count: transaction.item_count(),
        }
    }

    /// Build a domain cart from request lines; every line is tagged with the
    /// store the checkout happens in.
    pub fn to_domain_cart(lines: Vec<CartLineRequest>, store: StoreCategory) -> Cart {
        Cart::new(
            lines
                .into_iter()
                .map(|line| CartLine {
                    item_id: line.item_id,
                    item_name: line.item_name,
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    category: store,
                })
                .collect(),
        )
    }

    pub fn cart_line_request(item_id: &str, item_name: &str, unit_price: Decimal, quantity: u32) -> CartLineRequest {
        CartLineRequest {
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
            unit_price,
            quantity,
        }
    }
}
