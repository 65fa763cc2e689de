// Revenue from a linear price relation p = a x + b

use std::sync::LazyLock;

use regex::Regex;

use crate::format::fmt_num;
use crate::record::{QuestionRecord, SolverResult};

static LINEAR_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"p\s*=\s*([+-]?\d*\.?\d*)\s*x\s*([+-]\s*\d+(?:\.\d+)?)").unwrap()
});
static MARGINAL_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R'\(\s*([\d,\s]+?)\s*\)").unwrap());

const SIGN_NOTE: &str = "If R'(x0) > 0 revenue increases, if < 0 decreases, if 0 stationary.";

/// `a x^n` with a signed joint, e.g. `- 0.1x^2`, `+ 50x`.
fn signed_term(coef: f64, var: &str, lead: bool) -> String {
    let body = format!("{}{}", fmt_num(coef.abs()), var);
    match (lead, coef < 0.0) {
        (true, true) => format!("-{body}"),
        (true, false) => body,
        (false, true) => format!(" - {body}"),
        (false, false) => format!(" + {body}"),
    }
}

/// `R(x) = p x = a x^2 + b x`, `R'(x) = 2a x + b`, and `R'(x0)` when the
/// question names a point.
pub fn solve(row: &QuestionRecord) -> Option<SolverResult> {
    let caps = LINEAR_PRICE.captures(&row.question_latex)?;
    let a: f64 = match &caps[1] {
        "" | "+" => 1.0,
        "-" => -1.0,
        s => s.parse().ok()?,
    };
    let b: f64 = caps[2].replace(char::is_whitespace, "").parse().ok()?;

    let revenue = format!("R(x) = {}{}", signed_term(a, "x^2", true), signed_term(b, "x", false));
    let revenue_latex =
        format!("R(x) = {}{}", signed_term(a, "x^{2}", true), signed_term(b, "x", false));
    let marginal = format!("R'(x) = {}{}", signed_term(2.0 * a, "x", true), signed_const(b));

    let point = MARGINAL_POINT
        .captures(&row.question_text)
        .and_then(|c| c[1].replace([',', ' '], "").parse::<f64>().ok())
        .map(|x0| format!(", R'({}) = {}", fmt_num(x0), fmt_num(2.0 * a * x0 + b)))
        .unwrap_or_default();

    Some(SolverResult::new(
        format!("{revenue}; {marginal}{point}. {SIGN_NOTE}"),
        format!("{revenue_latex},\\ {marginal}{point}"),
    ))
}

fn signed_const(b: f64) -> String {
    if b < 0.0 {
        format!(" - {}", fmt_num(-b))
    } else {
        format!(" + {}", fmt_num(b))
    }
}
