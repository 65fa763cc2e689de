// Point elasticity of demand

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::expr::{normalize_expression_syntax, ParsedExpression};
use crate::extract::trim_trailing_clauses;
use crate::format::{fmt_exact, fmt_num, round_to};
use crate::record::{QuestionRecord, SolverResult};

static BASE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)p_?\{?0\}?\s*=\s*(\d+(?:\.\d+)?)").unwrap());
static DIRECT_DEMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bx\s*=\s*([^;\n,]+)").unwrap());
/// `x + a p + b = 0`, with `a` optionally parenthesized and possibly a fraction
static LINEAR_DEMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bx\s*\+\s*\(?\s*([+-]?\d+(?:\.\d+)?(?:/\d+)?)\s*\)?\s*p\s*([+-])\s*(\d+(?:\.\d+)?)\s*=\s*0",
    )
    .unwrap()
});
static SQRT_DEMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?sqrt\s*[({]([^(){}]+)[)}]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Elastic,
    Inelastic,
    Unitary,
}

impl Classification {
    pub fn from_elasticity(e: f64) -> Self {
        let magnitude = e.abs();
        if magnitude > 1.0 {
            Classification::Elastic
        } else if magnitude < 1.0 {
            Classification::Inelastic
        } else {
            Classification::Unitary
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Elastic => "elastic",
            Classification::Inelastic => "inelastic",
            Classification::Unitary => "unitary",
        }
    }

    fn revenue_note(self) -> &'static str {
        match self {
            Classification::Elastic => "Revenue decreases when price increases.",
            Classification::Inelastic => "Revenue increases when price increases.",
            Classification::Unitary => "Revenue unchanged for small price changes.",
        }
    }
}

/// Elasticity `E = -(p0 / x0) * dx/dp` at the stated base price, rounded.
pub fn point_elasticity(demand: &ParsedExpression, p0: f64) -> Option<f64> {
    let x0 = demand.eval(p0)?;
    if x0 == 0.0 {
        return None;
    }
    let h = (p0.abs() * 1e-5).max(1e-5);
    let slope = (demand.eval(p0 + h)? - demand.eval(p0 - h)?) / (2.0 * h);
    let e = -(p0 / x0) * slope;
    e.is_finite().then(|| round_to(e, 6))
}

/// Candidate demand functions `x(p)`, most explicit form first.
fn demand_candidates(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(caps) = DIRECT_DEMAND.captures(text) {
        out.push(trim_trailing_clauses(&caps[1]));
    }
    if let Some(caps) = LINEAR_DEMAND.captures(text) {
        if let (Some(a), Ok(b)) = (parse_ratio(&caps[1]), caps[3].parse::<f64>()) {
            let b = if &caps[2] == "-" { -b } else { b };
            // x + a p + b = 0  =>  x = -a p - b
            out.push(format!("({})*p + ({})", fmt_exact(-a), fmt_exact(-b)));
        }
    }
    if let Some(caps) = SQRT_DEMAND.captures(text) {
        out.push(format!("sqrt({})", &caps[1]));
    }
    out
}

fn parse_ratio(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((n, d)) => {
            let (n, d): (f64, f64) = (n.parse().ok()?, d.parse().ok()?);
            (d != 0.0).then(|| n / d)
        }
        None => s.parse().ok(),
    }
}

pub fn solve(row: &QuestionRecord) -> Option<SolverResult> {
    let text = row.combined_text();
    let p0: f64 = BASE_PRICE.captures(&text)?[1].parse().ok()?;

    let e = demand_candidates(&text).into_iter().find_map(|candidate| {
        let demand = ParsedExpression::new("p", &normalize_expression_syntax(&candidate)).ok()?;
        let e = point_elasticity(&demand, p0);
        if e.is_none() {
            debug!("demand {:?} gives no elasticity at p0={}", candidate, p0);
        }
        e
    })?;

    let class = Classification::from_elasticity(e);
    let e = fmt_num(e);
    Some(SolverResult::new(
        format!("E(p0) = {}; classification: {}. {}", e, class.as_str(), class.revenue_note()),
        format!("E({}) = {}", fmt_num(p0), e),
    ))
}
