//! Display formatting shared by reports and exports.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::StoreCategory;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Turn a camelCase key into a title-cased label: `dryFoodShop` -> `Dry Food Shop`
pub fn format_label(key: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(key, "$1 $2");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn category_label(category: StoreCategory) -> String {
    format_label(category.key())
}

/// Format an amount with two decimals, e.g. `R450.00` or `-R12.50`
pub fn format_amount(amount: Decimal, currency_symbol: &str) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}{:.2}", sign, currency_symbol, rounded)
}
