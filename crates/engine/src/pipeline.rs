// Row orchestration for the clean and answer stages
//
// Both stages map rows independently and preserve order. Nothing here fails:
// rows that cannot be normalized or solved pass through unchanged.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::extract::extract_math_from_text;
use crate::markup::{has_markup_signature, latex_to_plain, normalize_whitespace, to_latex_ascii};
use crate::record::{is_blank, QuestionRecord};
use crate::solvers::{self, SECOND_DERIVATIVE_CLUSTER};

/// Counts reported after the answer stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub rows: usize,
    /// Rows that already carried an answer and were left alone
    pub already_answered: usize,
    /// Rows given an answer by a solver
    pub answered: usize,
    /// Rows still without an answer after the stage
    pub unanswered: usize,
    /// Answers per solver name
    pub by_solver: BTreeMap<&'static str, usize>,
}

// ============================================================================
// Clean stage
// ============================================================================

/// Normalize a row's markup and strip extracted math out of its prose.
///
/// Markup that is empty or carries no markup commands triggers extraction from
/// the prose; when the markup is empty, the extracted statements (normalized,
/// joined with `; `) become the markup. Existing markup is always normalized.
pub fn clean_row(row: &QuestionRecord) -> QuestionRecord {
    let mut out = row.clone();
    let latex = row.question_latex.trim();
    let extraction = extract_math_from_text(&row.question_text);

    let new_latex = if latex.is_empty() {
        extraction.math_parts.iter().map(|p| to_latex_ascii(p)).collect::<Vec<_>>().join("; ")
    } else {
        if !has_markup_signature(latex) {
            debug!("row {:?}: markup without commands, re-extracting prose", row.id);
        }
        to_latex_ascii(latex)
    };

    out.question_text = normalize_whitespace(&extraction.clean_text);
    out.question_latex = normalize_whitespace(&new_latex);
    out
}

pub fn clean_bank(rows: &[QuestionRecord]) -> Vec<QuestionRecord> {
    let cleaned: Vec<QuestionRecord> = rows.iter().map(clean_row).collect();
    let filled = rows
        .iter()
        .zip(&cleaned)
        .filter(|(before, after)| {
            is_blank(&before.question_latex) && !is_blank(&after.question_latex)
        })
        .count();
    info!("cleaned {} rows, {} gained markup from extracted math", cleaned.len(), filled);
    cleaned
}

// ============================================================================
// Answer stage
// ============================================================================

/// Infer a missing answer. Returns the updated row and the solver that answered it.
///
/// Answered rows are skipped, except in the second-derivative cluster where a
/// fresh markup answer always replaces `answerLatex`. Blank plain-text answer
/// and solution fields are then backfilled from their markup counterparts.
pub fn answer_row(row: &QuestionRecord) -> (QuestionRecord, Option<&'static str>) {
    let mut out = row.clone();
    let refresh_markup = row.cluster.contains(SECOND_DERIVATIVE_CLUSTER);
    let mut solver = None;

    if !row.has_answer() || refresh_markup {
        if let Some((name, result)) = solvers::solve(row) {
            if is_blank(&out.answer) {
                out.answer = result.answer;
            }
            if refresh_markup || is_blank(&out.answer_latex) {
                out.answer_latex = result.answer_latex;
            }
            solver = Some(name);
        }
    }

    if is_blank(&out.answer) && !is_blank(&out.answer_latex) {
        out.answer = latex_to_plain(&out.answer_latex);
    }
    if is_blank(&out.solution_text) && !is_blank(&out.solution_latex) {
        out.solution_text = latex_to_plain(&out.solution_latex);
    }
    (out, solver)
}

pub fn answer_bank(rows: &[QuestionRecord]) -> (Vec<QuestionRecord>, BankSummary) {
    let mut summary = BankSummary { rows: rows.len(), ..Default::default() };
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let had_answer = row.has_answer();
        let (answered, solver) = answer_row(row);
        if had_answer {
            summary.already_answered += 1;
        } else if let Some(name) = solver {
            summary.answered += 1;
            *summary.by_solver.entry(name).or_default() += 1;
        }
        if !answered.has_answer() {
            summary.unanswered += 1;
        }
        out.push(answered);
    }

    info!(
        "{} rows: {} already answered, {} answered by solvers, {} unanswered",
        summary.rows, summary.already_answered, summary.answered, summary.unanswered
    );
    (out, summary)
}
