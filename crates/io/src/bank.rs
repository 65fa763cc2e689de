// Question bank files: CSV <-> QuestionRecord

use std::path::Path;

use log::info;
use qbank_engine::{QuestionRecord, COLUMNS};

use crate::csv;
use crate::error::BankError;

/// A loaded bank. `headers` is the file's header order with any missing
/// recognized columns appended, so writing always carries every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionBank {
    pub headers: Vec<String>,
    pub records: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn from_table(table: csv::CsvTable) -> Self {
        let mut headers = table.headers;
        for col in COLUMNS {
            if !headers.iter().any(|h| h == col) {
                headers.push(col.to_string());
            }
        }
        let records = table.rows.iter().map(QuestionRecord::from_fields).collect();
        Self { headers, records }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(|r| r.to_fields(&self.headers)).collect()
    }

    /// Same headers, new records.
    pub fn with_records(&self, records: Vec<QuestionRecord>) -> Self {
        Self { headers: self.headers.clone(), records }
    }
}

pub fn read_bank(path: &Path) -> Result<QuestionBank, BankError> {
    let table = csv::read(path)?;
    if table.headers.is_empty() {
        return Err(BankError::MissingHeader { path: path.to_path_buf() });
    }
    info!("read {} rows from {}", table.rows.len(), path.display());
    Ok(QuestionBank::from_table(table))
}

pub fn write_bank(path: &Path, bank: &QuestionBank) -> Result<(), BankError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BankError::io(parent, e))?;
    }
    csv::write(path, &bank.headers, &bank.rows())?;
    info!("wrote {} rows to {}", bank.records.len(), path.display());
    Ok(())
}

/// Copy `input` to `backup` unless a backup already exists. Returns whether a
/// copy was made; an existing backup is never overwritten.
pub fn ensure_backup(input: &Path, backup: &Path) -> Result<bool, BankError> {
    if backup.exists() {
        return Ok(false);
    }
    std::fs::copy(input, backup).map_err(|e| BankError::io(backup, e))?;
    Ok(true)
}
