// Function-expression extraction from question rows
//
// A row names its function as `f(x) = ...` or `f(t) = ...` in the markup or the
// prose. The right-hand side is lowered from markup to the parser's syntax and
// parsed once; numeric queries then run against the parsed tree.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::eval::{eval_expr, polynomial_coefficients};
use super::numeric::{central_first, central_second};
use super::parser::{parse, Expr, ExprError};
use crate::record::QuestionRecord;

static FUNCTION_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"f\((x|t)\)=([^,;]+)").unwrap());
static FRAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\d?frac\{([^{}]+)\}\{([^{}]+)\}").unwrap());
static SIZING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\?(left|right)").unwrap());
static EXP_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\be\^\(").unwrap());

/// A function of one variable, ready for numeric evaluation.
#[derive(Debug, Clone)]
pub struct ParsedExpression {
    pub variable: String,
    /// Normalized source text of the expression
    pub expression: String,
    ast: Expr,
}

impl ParsedExpression {
    pub fn new(variable: &str, expression: &str) -> Result<Self, ExprError> {
        let ast = parse(expression)?;
        Ok(Self { variable: variable.to_string(), expression: expression.to_string(), ast })
    }

    pub fn eval(&self, value: f64) -> Option<f64> {
        eval_expr(&self.ast, &self.variable, value)
    }

    pub fn first_derivative(&self, x: f64) -> Option<f64> {
        central_first(|v| self.eval(v), x)
    }

    pub fn second_derivative(&self, x: f64) -> Option<f64> {
        central_second(|v| self.eval(v), x)
    }

    /// Coefficients, constant term first, when the expression is a polynomial.
    pub fn polynomial(&self) -> Option<Vec<f64>> {
        polynomial_coefficients(&self.ast, &self.variable)
    }
}

/// Locate the row's function definition. Markup is searched before prose; the
/// first `f(x)=` / `f(t)=` match wins. A markup field holding a bare expression
/// in `x` or `t` (no `=`) is taken as an implicit definition.
pub fn parse_function_expression(row: &QuestionRecord) -> Option<ParsedExpression> {
    for source in [&row.question_latex, &row.question_text] {
        let compact: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(caps) = FUNCTION_DEF.captures(&compact) {
            return build(&caps[1], &caps[2]);
        }
    }

    let bare: String = row.question_latex.chars().filter(|c| !c.is_whitespace()).collect();
    if !bare.contains('=') && (bare.contains('x') || bare.contains('t')) {
        let var = if bare.contains('x') { "x" } else { "t" };
        return build(var, &bare);
    }
    None
}

fn build(var: &str, raw: &str) -> Option<ParsedExpression> {
    let normalized = normalize_expression_syntax(raw);
    match ParsedExpression::new(var, &normalized) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("unparseable expression {:?}: {}", normalized, e);
            None
        }
    }
}

/// Lower markup to plain parser syntax: fractions to division, sizing tokens
/// dropped, braces to parentheses, `e^(...)` to `exp(...)`, `**` to `^`.
pub fn normalize_expression_syntax(expr: &str) -> String {
    let mut s = expr.replace("\\cdot", "*").replace("\\times", "*");
    // Innermost fractions first; each pass removes one brace level
    while FRAC.is_match(&s) {
        s = FRAC.replace_all(&s, "(($1)/($2))").into_owned();
    }
    s = SIZING.replace_all(&s, "").into_owned();
    s = s.replace('\\', "").replace('{', "(").replace('}', ")").replace("**", "^");
    EXP_CALL.replace_all(&s, "exp(").into_owned()
}
