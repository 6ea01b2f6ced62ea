pub mod cart;
pub mod student;
pub mod transaction;

pub use cart::{Cart, CartLine};
pub use student::Student;
pub use transaction::{Transaction, TransactionKind};
