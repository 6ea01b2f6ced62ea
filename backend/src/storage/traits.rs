//! # Storage Traits
//!
//! Storage abstraction used by the domain services. The only backend is the
//! in-memory store in [`super::memory`], but services are written against
//! these traits so tests and callers can supply their own.

use anyhow::Result;

use crate::domain::models::{Student, Transaction};

/// Student records, keyed by student ID
pub trait StudentStorage: Send + Sync {
    /// Store a new student
    fn store_student(&self, student: &Student) -> Result<()>;

    /// Retrieve a specific student by ID
    fn get_student(&self, student_id: &str) -> Result<Option<Student>>;

    /// List all students ordered by name
    fn list_students(&self) -> Result<Vec<Student>>;

    /// Replace an existing student record
    fn update_student(&self, student: &Student) -> Result<()>;
}

/// Append-only transaction log
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction
    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Store a transaction together with the student state it produced.
    /// Either both writes land or neither does.
    fn record_transaction(&self, student: &Student, transaction: &Transaction) -> Result<()>;

    /// List transactions for one student, most recent first
    fn list_transactions_for_student(&self, student_id: &str) -> Result<Vec<Transaction>>;

    /// List every transaction in chronological order (oldest first)
    fn list_all_transactions(&self) -> Result<Vec<Transaction>>;
}

/// Factory for the repositories of one storage backend
pub trait Connection: Send + Sync + Clone {
    type StudentRepository: StudentStorage + Clone;
    type TransactionRepository: TransactionStorage + Clone;

    fn create_student_repository(&self) -> Self::StudentRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository;
}
