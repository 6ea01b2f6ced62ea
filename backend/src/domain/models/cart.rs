//! Domain model for a POS cart.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::StoreCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub item_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub category: StoreCategory,
}

impl CartLine {
    /// `unit_price * quantity`, or `None` if it does not fit in a `Decimal`
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Sum of `unit_price * quantity` over every line. `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total()?))
    }
}
