//! Student lookup and provisioning.
//!
//! Registration, blocking and the weekly reset all rewrite student records,
//! so they take the same [`WriteLock`] as checkout and recharge.
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use shared::SpendingLimits;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::models::Student;
use super::wallet_ledger::{self, CheckoutError};
use super::write_lock::WriteLock;
use crate::storage::{Connection, StudentStorage};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StudentValidationError {
    #[error("Student name cannot be empty")]
    EmptyName,
    #[error("Student name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Card number cannot be empty")]
    EmptyCardNumber,
    #[error("Card {0} is already assigned to an active student")]
    DuplicateCard(String),
    #[error("Opening balance cannot be negative")]
    NegativeOpeningBalance,
}

/// Input for registering a new student.
#[derive(Debug, Clone)]
pub struct RegisterStudentCommand {
    pub name: String,
    pub class_name: String,
    pub card_number: String,
    pub opening_balance: Decimal,
    /// Falls back to the configured defaults when `None`
    pub weekly_spending_limits: Option<SpendingLimits>,
}

#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: Arc<C::StudentRepository>,
    default_limits: SpendingLimits,
    write_lock: WriteLock,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: &C, default_limits: SpendingLimits, write_lock: WriteLock) -> Self {
        Self {
            student_repository: Arc::new(connection.create_student_repository()),
            default_limits,
            write_lock,
        }
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        let students = self.student_repository.list_students()?;
        info!("Found {} students", students.len());
        Ok(students)
    }

    pub fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let student = self.student_repository.get_student(student_id)?;
        if student.is_none() {
            warn!("Student not found: {}", student_id);
        }
        Ok(student)
    }

    /// Look up the student holding `card_number`
    pub fn find_by_card(&self, card_number: &str) -> Result<Student> {
        let students = self.student_repository.list_students()?;
        let student = wallet_ledger::find_by_card(&students, card_number)?;
        Ok(student.clone())
    }

    pub fn register_student(&self, command: RegisterStudentCommand) -> Result<Student> {
        info!("Registering student: name={}, card={}", command.name, command.card_number);

        let _guard = self.write_lock.acquire();
        let existing = self.student_repository.list_students()?;
        Self::validate_registration(&command, &existing)?;

        let student = Student {
            id: Student::generate_id(),
            name: command.name.trim().to_string(),
            class_name: command.class_name.trim().to_string(),
            card_number: command.card_number.trim().to_string(),
            wallet_balance: command.opening_balance,
            is_active: true,
            weekly_spending_limits: command.weekly_spending_limits.unwrap_or(self.default_limits),
            current_week_spending: SpendingLimits::default(),
            last_transaction_at: None,
        };

        self.student_repository.store_student(&student)?;
        info!("Registered student {} with ID {}", student.name, student.id);
        Ok(student)
    }

    /// Activate or block a card
    pub fn set_active(&self, student_id: &str, is_active: bool) -> Result<Student> {
        let _guard = self.write_lock.acquire();
        let mut student = self
            .student_repository
            .get_student(student_id)?
            .ok_or_else(|| anyhow!("Student not found: {}", student_id))?;
        student.is_active = is_active;
        self.student_repository.update_student(&student)?;
        info!("Student {} active={}", student_id, is_active);
        Ok(student)
    }

    /// Zero every student's weekly spend. Returns how many students were reset.
    pub fn reset_weekly_spending_all(&self) -> Result<usize> {
        let _guard = self.write_lock.acquire();
        let students = self.student_repository.list_students()?;
        for mut student in students.iter().cloned() {
            wallet_ledger::reset_weekly_spending(&mut student);
            self.student_repository.update_student(&student)?;
        }
        info!("Reset weekly spending for {} students", students.len());
        Ok(students.len())
    }

    fn validate_registration(
        command: &RegisterStudentCommand,
        existing: &[Student],
    ) -> Result<(), StudentValidationError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if name.chars().count() > 100 {
            return Err(StudentValidationError::NameTooLong);
        }

        let card_number = command.card_number.trim();
        if card_number.is_empty() {
            return Err(StudentValidationError::EmptyCardNumber);
        }
        if existing
            .iter()
            .any(|s| s.is_active && s.card_number == card_number)
        {
            return Err(StudentValidationError::DuplicateCard(card_number.to_string()));
        }

        if command.opening_balance < Decimal::ZERO {
            return Err(StudentValidationError::NegativeOpeningBalance);
        }
        Ok(())
    }
}

/// True when the error came from a failed card lookup
pub fn is_student_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<CheckoutError>(),
        Some(CheckoutError::StudentNotFound { .. })
    )
}
