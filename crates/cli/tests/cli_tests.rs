// Integration tests for the `qbank` binary: clean, answer, run.
// Run with: cargo test -p qbank-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bank.csv")
}

/// A scratch project: the fixture as `bank/all-questions.csv`, no config files
/// visible (user config dir redirected into the scratch dir).
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("bank")).unwrap();
    fs::copy(fixture(), dir.path().join("bank/all-questions.csv")).unwrap();
    dir
}

fn qbank(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qbank"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("QBANK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    qbank(dir).args(args).output().expect("run qbank")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn read(path: PathBuf) -> qbank_io::QuestionBank {
    qbank_io::read_bank(&path).unwrap()
}

// ---------------------------------------------------------------------------
// run: clean then answer
// ---------------------------------------------------------------------------

#[test]
fn run_is_the_default_command() {
    let dir = project();
    let output = run(dir.path(), &["--data-dir", "bank"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("Reading: bank/all-questions.csv"), "{err}");
    let backup_line = "Creating backup of original CSV: bank/all-questions.backup.csv";
    assert!(err.contains(backup_line), "{err}");
    assert!(err.contains("Writing cleaned CSV: bank/all-questions.cleaned.csv"), "{err}");
    assert!(err.contains("Reading: bank/all-questions.cleaned.csv"), "{err}");
    assert!(err.contains("Wrote bank/all-questions.answered.csv"), "{err}");
    assert!(err.contains("4 rows, 3 answered by solvers"), "{err}");

    let original = fs::read_to_string(fixture()).unwrap();
    let backup = fs::read_to_string(dir.path().join("bank/all-questions.backup.csv")).unwrap();
    assert_eq!(backup, original);
}

#[test]
fn cleaned_bank_moves_math_into_markup() {
    let dir = project();
    let output = run(dir.path(), &["clean", "--data-dir", "bank"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!dir.path().join("bank/all-questions.answered.csv").exists());

    let bank = read(dir.path().join("bank/all-questions.cleaned.csv"));
    assert_eq!(bank.records.len(), 4);

    let ext2 = &bank.records[1];
    assert_eq!(ext2.id, "ext-2");
    assert_eq!(ext2.question_latex, "f(x) = x^3 - 3x");
    assert_eq!(ext2.question_text, "Let. Find the relative extrema.");

    assert_eq!(bank.records[3].question_text, "Define continuity.");
}

#[test]
fn answered_bank_keeps_columns_and_existing_answers() {
    let dir = project();
    let output = run(dir.path(), &["run", "--data-dir", "bank"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = fs::read_to_string(dir.path().join("bank/all-questions.answered.csv")).unwrap();
    let header = written.lines().next().unwrap();
    assert_eq!(
        header,
        "id,cluster,topic,questionText,questionLatex,answer,notes,\
         hint,answerLatex,solutionText,solutionLatex"
    );

    let bank = read(dir.path().join("bank/all-questions.answered.csv"));
    let answers: Vec<&str> = bank.records.iter().map(|r| r.answer.as_str()).collect();
    assert_eq!(
        answers,
        vec![
            "relative minimum at x=2, f=-1",
            "relative maximum at x=-1, f=2; relative minimum at x=1, f=-2",
            "dx/dt = -0.285714 (thousand units per month)",
            "Yes",
        ]
    );
    assert_eq!(bank.records[2].answer_latex, "\\dfrac{dx}{dt} = -0.285714");
    assert_eq!(bank.records[2].get("notes"), "units, thousands");
    assert_eq!(bank.records[3].answer_latex, "");
    assert_eq!(bank.records[3].get("notes"), "keep");
}

// ---------------------------------------------------------------------------
// backup
// ---------------------------------------------------------------------------

#[test]
fn backup_is_created_only_once() {
    let dir = project();
    assert!(run(dir.path(), &["clean", "--data-dir", "bank"]).status.success());

    let input = dir.path().join("bank/all-questions.csv");
    fs::write(&input, "id,topic\nnew,Limits\n").unwrap();
    let output = run(dir.path(), &["clean", "--data-dir", "bank"]);
    assert!(output.status.success());
    assert!(!stderr(&output).contains("Creating backup"));

    let backup = fs::read_to_string(dir.path().join("bank/all-questions.backup.csv")).unwrap();
    assert_eq!(backup, fs::read_to_string(fixture()).unwrap());
}

// ---------------------------------------------------------------------------
// configuration
// ---------------------------------------------------------------------------

#[test]
fn local_config_sets_file_names() {
    let dir = project();
    let bank = dir.path().join("bank");
    fs::rename(bank.join("all-questions.csv"), bank.join("questions.csv")).unwrap();
    fs::write(
        dir.path().join("qbank.toml"),
        "[paths]\ndata_dir = \"bank\"\ninput = \"questions.csv\"\nanswered = \"final.csv\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("bank/final.csv").exists());
    assert!(dir.path().join("bank/all-questions.cleaned.csv").exists());
}

#[test]
fn invalid_config_exits_5() {
    let dir = project();
    let config = dir.path().join("broken.toml");
    fs::write(&config, "[paths\n").unwrap();

    let output = run(dir.path(), &["--config", config.to_str().unwrap(), "--data-dir", "bank"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("error: invalid config"));
}

// ---------------------------------------------------------------------------
// failures
// ---------------------------------------------------------------------------

#[test]
fn answer_without_cleaned_bank_exits_3_with_hint() {
    let dir = project();
    let output = run(dir.path(), &["answer", "--data-dir", "bank"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("hint:  run `qbank clean` first"), "{}", stderr(&output));
}

#[test]
fn missing_input_exits_3() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["clean", "--data-dir", "nowhere"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("--data-dir"));
}

#[test]
fn empty_input_exits_4() {
    let dir = project();
    fs::write(dir.path().join("bank/all-questions.csv"), "").unwrap();
    let output = run(dir.path(), &["clean", "--data-dir", "bank"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("no header row"));
}

#[test]
fn unknown_flag_exits_2() {
    let dir = project();
    let output = run(dir.path(), &["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// output modes
// ---------------------------------------------------------------------------

#[test]
fn json_summary_on_stdout() {
    let dir = project();
    let output = run(dir.path(), &["--data-dir", "bank", "--json", "--quiet"]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "quiet run wrote: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(report["clean"]["rows"], 4);
    assert_eq!(report["clean"]["backup_created"], true);
    assert_eq!(report["answer"]["rows"], 4);
    assert_eq!(report["answer"]["answered"], 3);
    assert_eq!(report["answer"]["already_answered"], 1);
    assert_eq!(report["answer"]["unanswered"], 0);
    assert_eq!(report["answer"]["by_solver"]["relative-extrema"], 2);
    assert_eq!(report["answer"]["by_solver"]["related-rates"], 1);
}

#[test]
fn clean_only_json_has_no_answer_section() {
    let dir = project();
    let output = run(dir.path(), &["clean", "--data-dir", "bank", "--json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert!(report.get("answer").is_none());
    assert_eq!(report["clean"]["output"], "bank/all-questions.cleaned.csv");
}
