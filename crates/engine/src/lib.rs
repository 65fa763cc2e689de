pub mod expr;
pub mod extract;
pub mod format;
pub mod markup;
pub mod pipeline;
pub mod record;
pub mod solvers;

pub use pipeline::{answer_bank, answer_row, clean_bank, clean_row, BankSummary};
pub use record::{QuestionRecord, SolverResult, COLUMNS};
