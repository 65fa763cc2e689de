// qbank - clean question-bank CSV files and infer missing answers

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use qbank_config::{BankConfig, BankPaths, ConfigError};
use qbank_engine::{answer_bank, clean_bank, BankSummary, COLUMNS};
use qbank_io::{ensure_backup, read_bank, write_bank, BankError};

use exit_codes::{bank_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "qbank")]
#[command(about = "Clean question-bank CSV files and infer missing answers")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (default: ./qbank.toml, then the user config directory)
    #[arg(long, global = true, env = "QBANK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the bank files (overrides [paths].data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Suppress status messages and logging
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-row solver decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print a JSON summary to stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Clone, Copy, PartialEq)]
enum Commands {
    /// Normalize markup and pull math out of prose; backs up the input once
    #[command(after_help = "\
Examples:
  qbank clean
  qbank clean --data-dir banks/calculus")]
    Clean,

    /// Fill missing answers from the cleaned bank
    Answer,

    /// Clean, then answer (the default)
    Run,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = run(&cli);

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// stderr logging; RUST_LOG wins unless -q or -v is given.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("qbank=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qbank=info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = BankConfig::load(cli.config.as_deref()).map_err(CliError::config)?;
    if let Some(source) = &config.source {
        debug!("using config {}", source.display());
    }
    let paths = config.resolve(cli.data_dir.as_deref());
    let status = Status { quiet: cli.quiet };

    let command = cli.command.unwrap_or(Commands::Run);
    let mut report = Report::default();
    if matches!(command, Commands::Clean | Commands::Run) {
        report.clean = Some(cmd_clean(&paths, &status)?);
    }
    if matches!(command, Commands::Answer | Commands::Run) {
        report.answer = Some(cmd_answer(&paths, &status)?);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", json);
    }
    Ok(())
}

// ============================================================================
// Status output
// ============================================================================

struct Status {
    quiet: bool,
}

impl Status {
    fn say(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    clean: Option<CleanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<AnswerReport>,
}

#[derive(Debug, Serialize)]
struct CleanReport {
    input: PathBuf,
    output: PathBuf,
    rows: usize,
    /// Set when this run created the backup copy
    backup_created: bool,
}

#[derive(Debug, Serialize)]
struct AnswerReport {
    input: PathBuf,
    output: PathBuf,
    #[serde(flatten)]
    summary: BankSummary,
}

// ============================================================================
// clean
// ============================================================================

fn cmd_clean(paths: &BankPaths, status: &Status) -> Result<CleanReport, CliError> {
    status.say(format!("Reading: {}", paths.input.display()));
    let bank = read_bank(&paths.input).map_err(CliError::bank)?;

    let backup_created = ensure_backup(&paths.input, &paths.backup).map_err(CliError::bank)?;
    if backup_created {
        status.say(format!("Creating backup of original CSV: {}", paths.backup.display()));
    }

    let cleaned = bank.with_records(clean_bank(&bank.records));
    status.say(format!("Writing cleaned CSV: {}", paths.cleaned.display()));
    write_bank(&paths.cleaned, &cleaned).map_err(CliError::bank)?;

    Ok(CleanReport {
        input: paths.input.clone(),
        output: paths.cleaned.clone(),
        rows: cleaned.records.len(),
        backup_created,
    })
}

// ============================================================================
// answer
// ============================================================================

fn cmd_answer(paths: &BankPaths, status: &Status) -> Result<AnswerReport, CliError> {
    status.say(format!("Reading: {}", paths.cleaned.display()));
    let bank = read_bank(&paths.cleaned)
        .map_err(|e| missing_cleaned_hint(CliError::bank(e), &paths.cleaned))?;

    let (records, summary) = answer_bank(&bank.records);
    let answered = bank.with_records(records);
    write_bank(&paths.answered, &answered).map_err(CliError::bank)?;
    status.say(format!("Wrote {}", paths.answered.display()));
    status.say(format!("{} rows, {} answered by solvers", summary.rows, summary.answered));

    Ok(AnswerReport {
        input: paths.cleaned.clone(),
        output: paths.answered.clone(),
        summary,
    })
}

fn missing_cleaned_hint(err: CliError, cleaned: &Path) -> CliError {
    if cleaned.exists() {
        err
    } else {
        err.with_hint("run `qbank clean` first to produce the cleaned bank")
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn bank(err: BankError) -> Self {
        let code = bank_exit_code(&err);
        let hint = match &err {
            BankError::MissingHeader { .. } => {
                Some(format!("the first line must name the columns, e.g. {}", COLUMNS.join(",")))
            }
            BankError::Io { path, .. } if !path.exists() => {
                Some("pass --data-dir or set [paths].data_dir in qbank.toml".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    fn config(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
