use shared::StudentSummary;

use crate::domain::models::Student;

pub struct StudentMapper;

impl StudentMapper {
    pub fn to_dto(student: &Student) -> StudentSummary {
        StudentSummary {
            id: student.id.clone(),
            name: student.name.clone(),
            class_name: student.class_name.clone(),
            card_number: student.card_number.clone(),
            wallet_balance: student.wallet_balance,
            is_active: student.is_active,
            weekly_spending_limits: student.weekly_spending_limits,
            current_week_spending: student.current_week_spending,
            last_transaction_at: student.last_transaction_at.map(|t| t.to_rfc3339()),
        }
    }
}
