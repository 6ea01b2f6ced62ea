pub mod student_mapper;
pub mod transaction_mapper;

pub use student_mapper::StudentMapper;
pub use transaction_mapper::TransactionMapper;
