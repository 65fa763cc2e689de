use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BankError {
    /// File could not be read, written, or copied.
    Io { path: PathBuf, message: String },
    /// Malformed CSV content.
    Csv(String),
    /// The file has no header row.
    MissingHeader { path: PathBuf },
}

impl BankError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self::Io { path: path.into(), message: err.to_string() }
    }
}

impl fmt::Display for BankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingHeader { path } => write!(f, "{}: no header row found", path.display()),
        }
    }
}

impl std::error::Error for BankError {}

impl From<csv::Error> for BankError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
