// Marginal cost by closed-form term rules
//
// The cost function is split into top-level additive terms and each term is
// differentiated by a fixed rule table. Terms outside the table contribute
// nothing to the derivative.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::format::{fmt_num, round_to};
use crate::record::{QuestionRecord, SolverResult};

/// Evaluation points taken from the question.
const MAX_POINTS: usize = 3;

static COST_DEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"C\(x\)\s*=\s*(.+)$").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

static POWER_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*\.?\d*)x\^\{?\(?([+-]?\d+(?:\.\d+)?(?:/\d+)?)\)?\}?$").unwrap()
});
static LINEAR_TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d*\.?\d*)x$").unwrap());
static CONSTANT_TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d*\.?\d+$").unwrap());
static SQRT_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*\.?\d*)\\?sqrt[({](\d*\.?\d*)x([+-]\d*\.?\d+)?[)}]$").unwrap()
});
static EXP_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*\.?\d*)e\^[({](\d*\.?\d*)x([+-]\d*\.?\d+)?[)}]$").unwrap()
});
static LN_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*\.?\d*)\\?ln(?:\\left)?\(x\^\{?2\}?([+-]\d+(?:\.\d+)?)(?:\\right)?\)$").unwrap()
});

pub fn solve(row: &QuestionRecord) -> Option<SolverResult> {
    let mut segments = row.question_latex.split(';');
    let definition = segments.next()?.trim();
    let expr = COST_DEF.captures(definition)?.get(1)?.as_str().to_string();

    let mut points = numbers_in(&row.question_text);
    if points.is_empty() {
        points = numbers_in(&segments.collect::<Vec<_>>().join(";"));
    }

    let values: Vec<(f64, f64)> = points
        .into_iter()
        .filter_map(|x| {
            let v = marginal_cost_at(&expr, x);
            v.is_finite().then(|| (x, round_to(v, 6)))
        })
        .collect();
    if values.is_empty() {
        return None;
    }

    let parts: Vec<String> =
        values.iter().map(|&(x, v)| format!("C'( {} ) = {}", fmt_num(x), fmt_num(v))).collect();
    let mut answer = parts.join("; ");
    if let &[(_, first), (_, second), ..] = values.as_slice() {
        let trend = if second < first {
            "Marginal cost decreases as production increases."
        } else if second > first {
            "Marginal cost increases as production increases."
        } else {
            "Marginal cost is constant."
        };
        answer.push_str(". ");
        answer.push_str(trend);
    }
    Some(SolverResult::new(answer, parts.join(", ")))
}

fn numbers_in(s: &str) -> Vec<f64> {
    NUMBER.find_iter(s).filter_map(|m| m.as_str().parse().ok()).take(MAX_POINTS).collect()
}

/// `C'(x)` as the sum of the recognized terms' derivatives.
pub fn marginal_cost_at(expr: &str, x: f64) -> f64 {
    split_terms(expr)
        .into_iter()
        .filter_map(|(sign, body)| term_derivative(&body, x).map(|d| sign * d))
        .sum()
}

/// Split on `+`/`-` outside parentheses and braces. Each term carries its sign
/// separately; whitespace, `*`, and `\cdot` are dropped from the body.
fn split_terms(expr: &str) -> Vec<(f64, String)> {
    let cleaned = expr.replace('−', "-").replace("\\cdot", "");
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut sign = 1.0;
    let mut depth = 0i32;
    let mut prev = None;

    for c in cleaned.chars().filter(|c| !c.is_whitespace() && *c != '*') {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            _ => {}
        }
        let is_sign = matches!(c, '+' | '-') && depth == 0 && prev != Some('^');
        if is_sign {
            let s = if c == '-' { -1.0 } else { 1.0 };
            if current.is_empty() {
                sign *= s;
            } else {
                terms.push((sign, std::mem::take(&mut current)));
                sign = s;
            }
        } else {
            current.push(c);
        }
        prev = Some(c);
    }
    if !current.is_empty() {
        terms.push((sign, current));
    }
    terms
}

fn coefficient(s: &str) -> Option<f64> {
    if s.is_empty() {
        Some(1.0)
    } else {
        s.parse().ok()
    }
}

fn offset(caps: &Captures, i: usize) -> Option<f64> {
    caps.get(i).map_or(Some(0.0), |m| m.as_str().parse().ok())
}

fn exponent(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((n, d)) => Some(n.parse::<f64>().ok()? / d.parse::<f64>().ok()?),
        None => s.parse().ok(),
    }
}

/// Derivative of one unsigned term at `x`, or `None` when no rule matches.
fn term_derivative(body: &str, x: f64) -> Option<f64> {
    if let Some(c) = POWER_TERM.captures(body) {
        let a = coefficient(&c[1])?;
        let n = exponent(&c[2])?;
        return Some(a * n * x.powf(n - 1.0));
    }
    if let Some(c) = LINEAR_TERM.captures(body) {
        return coefficient(&c[1]);
    }
    if CONSTANT_TERM.is_match(body) {
        return Some(0.0);
    }
    if let Some(c) = SQRT_TERM.captures(body) {
        let k = coefficient(&c[1])?;
        let a = coefficient(&c[2])?;
        let b = offset(&c, 3)?;
        return Some(k * a / (2.0 * (a * x + b).sqrt()));
    }
    if let Some(c) = EXP_TERM.captures(body) {
        let k = coefficient(&c[1])?;
        let a = coefficient(&c[2])?;
        let b = offset(&c, 3)?;
        return Some(k * a * (a * x + b).exp());
    }
    if let Some(c) = LN_TERM.captures(body) {
        let k = coefficient(&c[1])?;
        let shift: f64 = c[2].parse().ok()?;
        return Some(k * 2.0 * x / (x * x + shift));
    }
    None
}
