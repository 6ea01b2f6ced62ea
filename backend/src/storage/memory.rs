use anyhow::{anyhow, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::traits::{Connection, StudentStorage, TransactionStorage};
use crate::domain::models::{Student, Transaction};

#[derive(Debug, Default)]
struct MemoryState {
    students: Vec<Student>,
    transactions: Vec<Transaction>,
}

/// In-memory storage shared by all repositories created from it
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connection pre-populated with students
    pub fn with_students(students: Vec<Student>) -> Self {
        let connection = Self::new();
        if let Ok(mut state) = connection.state.write() {
            state.students = students;
        }
        connection
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl Connection for MemoryConnection {
    type StudentRepository = MemoryStudentRepository;
    type TransactionRepository = MemoryTransactionRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        MemoryStudentRepository {
            connection: self.clone(),
        }
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        MemoryTransactionRepository {
            connection: self.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStudentRepository {
    connection: MemoryConnection,
}

impl StudentStorage for MemoryStudentRepository {
    fn store_student(&self, student: &Student) -> Result<()> {
        let mut state = self.connection.write()?;
        if state.students.iter().any(|s| s.id == student.id) {
            return Err(anyhow!("Student already exists: {}", student.id));
        }
        state.students.push(student.clone());
        debug!("Stored student {}", student.id);
        Ok(())
    }

    fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let state = self.connection.read()?;
        Ok(state.students.iter().find(|s| s.id == student_id).cloned())
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        let state = self.connection.read()?;
        let mut students = state.students.clone();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    fn update_student(&self, student: &Student) -> Result<()> {
        let mut state = self.connection.write()?;
        let existing = state
            .students
            .iter_mut()
            .find(|s| s.id == student.id)
            .ok_or_else(|| anyhow!("Student not found: {}", student.id))?;
        *existing = student.clone();
        debug!("Updated student {}", student.id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTransactionRepository {
    connection: MemoryConnection,
}

impl TransactionStorage for MemoryTransactionRepository {
    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut state = self.connection.write()?;
        state.transactions.push(transaction.clone());
        debug!("Stored transaction {}", transaction.id);
        Ok(())
    }

    fn record_transaction(&self, student: &Student, transaction: &Transaction) -> Result<()> {
        let mut state = self.connection.write()?;
        let existing = state
            .students
            .iter_mut()
            .find(|s| s.id == student.id)
            .ok_or_else(|| anyhow!("Student not found: {}", student.id))?;
        *existing = student.clone();
        state.transactions.push(transaction.clone());
        debug!("Recorded transaction {} for {}", transaction.id, student.id);
        Ok(())
    }

    fn list_transactions_for_student(&self, student_id: &str) -> Result<Vec<Transaction>> {
        let state = self.connection.read()?;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }

    fn list_all_transactions(&self) -> Result<Vec<Transaction>> {
        let state = self.connection.read()?;
        let mut transactions = state.transactions.clone();
        transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(transactions)
    }
}
