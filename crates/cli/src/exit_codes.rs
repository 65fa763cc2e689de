//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | CLI usage error (bad args)                    |
//! | 3    | Bank file could not be read, written, copied  |
//! | 4    | Bank file has no header row or bad CSV        |
//! | 5    | Configuration file unreadable or invalid      |

use qbank_io::BankError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. Reported by clap before any command runs.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// Input, output, or backup file I/O failed.
pub const EXIT_IO: u8 = 3;

/// The bank file is structurally unusable.
pub const EXIT_STRUCTURE: u8 = 4;

/// The configuration file could not be read or parsed.
pub const EXIT_CONFIG: u8 = 5;

pub fn bank_exit_code(err: &BankError) -> u8 {
    match err {
        BankError::Io { .. } => EXIT_IO,
        BankError::Csv(_) | BankError::MissingHeader { .. } => EXIT_STRUCTURE,
    }
}
