//! # Storage Module
//!
//! Holds student and transaction state for the POS backend. Everything lives
//! in memory and is seeded from mock fixtures; nothing is persisted.
//!
//! - **traits**: storage interfaces the domain services depend on
//! - **memory**: `RwLock`-backed implementation of those interfaces
//! - **fixtures**: the mock students the backend starts with

pub mod fixtures;
pub mod memory;
pub mod traits;

pub use memory::{MemoryConnection, MemoryStudentRepository, MemoryTransactionRepository};
pub use traits::{Connection, StudentStorage, TransactionStorage};
