// File I/O operations

pub mod bank;
pub mod csv;
pub mod error;

pub use bank::{ensure_backup, read_bank, write_bank, QuestionBank};
pub use error::BankError;
