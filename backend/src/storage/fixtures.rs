//! Mock students the backend is seeded with.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::SpendingLimits;

use crate::domain::models::Student;

fn student(
    id: &str,
    name: &str,
    class_name: &str,
    card_number: &str,
    wallet_balance: Decimal,
    is_active: bool,
    current_week_spending: SpendingLimits,
) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        class_name: class_name.to_string(),
        card_number: card_number.to_string(),
        wallet_balance,
        is_active,
        weekly_spending_limits: SpendingLimits::new(dec!(150), dec!(200), dec!(100)),
        current_week_spending,
        last_transaction_at: None,
    }
}

pub fn mock_students() -> Vec<Student> {
    vec![
        student(
            "student::1",
            "Thabo Nkosi",
            "Grade 8A",
            "RFID-0001",
            dec!(450),
            true,
            SpendingLimits::new(dec!(85), dec!(0), dec!(0)),
        ),
        student(
            "student::2",
            "Aisha Patel",
            "Grade 9B",
            "RFID-0002",
            dec!(120.50),
            true,
            SpendingLimits::new(dec!(40), dec!(55.25), dec!(10)),
        ),
        student(
            "student::3",
            "Liam van der Merwe",
            "Grade 10C",
            "RFID-0003",
            dec!(15),
            true,
            SpendingLimits::default(),
        ),
        student(
            "student::4",
            "Zanele Dlamini",
            "Grade 8B",
            "RFID-0004",
            dec!(300),
            false,
            SpendingLimits::new(dec!(20), dec!(0), dec!(0)),
        ),
    ]
}
