// Relative and absolute extrema, and the second-derivative-test variant

use std::sync::LazyLock;

use regex::Regex;

use crate::expr::numeric::scan_roots;
use crate::expr::{parse_function_expression, ParsedExpression};
use crate::format::{fmt_num, round_to};
use crate::record::{QuestionRecord, SolverResult};

/// Default search window for critical points when no interval is given.
const SEARCH_LO: f64 = -5.0;
const SEARCH_HI: f64 = 5.0;
/// Grid cells per search window.
const SEARCH_CELLS: usize = 20;
/// Second derivatives smaller than this classify as a saddle.
const FLAT_CURVATURE: f64 = 1e-6;

static CLOSED_INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)\s*\]").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Minimum,
    Maximum,
    Saddle,
}

impl Kind {
    fn from_curvature(s: f64) -> Self {
        if s.abs() < FLAT_CURVATURE {
            Kind::Saddle
        } else if s > 0.0 {
            Kind::Minimum
        } else {
            Kind::Maximum
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Minimum => "relative minimum",
            Kind::Maximum => "relative maximum",
            Kind::Saddle => "saddle point",
        }
    }
}

/// First `[a, b]` stated in the row's prose or markup.
pub fn closed_interval(row: &QuestionRecord) -> Option<(f64, f64)> {
    let haystack = format!("{}{}", row.question_text, row.question_latex);
    let caps = CLOSED_INTERVAL.captures(&haystack)?;
    let a: f64 = caps[1].parse().ok()?;
    let b: f64 = caps[2].parse().ok()?;
    Some((a, b))
}

// ============================================================================
// Relative extrema
// ============================================================================

pub fn solve_relative(row: &QuestionRecord) -> Option<SolverResult> {
    let f = parse_function_expression(row)?;

    let critical = match f.polynomial() {
        Some(c) if c.len() == 3 => quadratic_vertex(&c),
        Some(c) if c.len() == 4 => match cubic_critical_points(&c) {
            Some(points) => points,
            None => {
                return Some(SolverResult::new(
                    "No relative extrema",
                    "\\text{No relative extrema}",
                ))
            }
        },
        _ => numeric_critical_points(&f),
    };

    let mut plain = Vec::new();
    let mut latex = Vec::new();
    for (x, kind) in critical {
        let Some(y) = f.eval(x) else { continue };
        let (xs, ys) = (fmt_num(x), fmt_num(y));
        plain.push(format!("{} at {}={}, f={}", kind.label(), f.variable, xs, ys));
        latex.push(format!("{} \\text{{ at }} {}={},\\ f={}", kind.label(), f.variable, xs, ys));
    }
    if plain.is_empty() {
        return None;
    }
    Some(SolverResult::new(plain.join("; "), latex.join("; ")))
}

/// Same answer as relative extrema, annotated with the method.
pub fn solve_second_derivative_test(row: &QuestionRecord) -> Option<SolverResult> {
    let mut result = solve_relative(row)?;
    result.answer.push_str(" (by Second Derivative Test)");
    result.answer_latex.push_str(" \\text{(by Second Derivative Test)}");
    Some(result)
}

fn quadratic_vertex(c: &[f64]) -> Vec<(f64, Kind)> {
    let (b, a) = (c[1], c[2]);
    let kind = if a > 0.0 { Kind::Minimum } else { Kind::Maximum };
    vec![(-b / (2.0 * a), kind)]
}

/// Roots of `f' = 3a x^2 + 2b x + c`, classified by the exact `f'' = 6a x + 2b`.
/// `None` when `f'` has no real roots.
fn cubic_critical_points(c: &[f64]) -> Option<Vec<(f64, Kind)>> {
    let (cc, b, a) = (c[1], c[2], c[3]);
    let (qa, qb, qc) = (3.0 * a, 2.0 * b, cc);
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }

    let classify = |x: f64| (x, Kind::from_curvature(6.0 * a * x + 2.0 * b));
    if disc == 0.0 {
        return Some(vec![classify(-qb / (2.0 * qa))]);
    }
    let root = disc.sqrt();
    let mut xs = [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)];
    xs.sort_by(|l, r| l.total_cmp(r));
    Some(xs.into_iter().map(classify).collect())
}

fn numeric_critical_points(f: &ParsedExpression) -> Vec<(f64, Kind)> {
    let slope = |x: f64| f.first_derivative(x);
    let mut roots: Vec<f64> = scan_roots(slope, SEARCH_LO, SEARCH_HI, SEARCH_CELLS)
        .into_iter()
        .map(|x| round_to(x, 6))
        .collect();
    roots.sort_by(|l, r| l.total_cmp(r));
    roots.dedup();

    roots
        .into_iter()
        .filter_map(|x| f.second_derivative(x).map(|s| (x, Kind::from_curvature(s))))
        .collect()
}

// ============================================================================
// Absolute extrema on a closed interval
// ============================================================================

pub fn solve_absolute(row: &QuestionRecord) -> Option<SolverResult> {
    let (a, b) = closed_interval(row)?;
    if a >= b {
        return None;
    }
    let f = parse_function_expression(row)?;

    let mut candidates = vec![a, b];
    candidates.extend(
        scan_roots(|x| f.first_derivative(x), a, b, SEARCH_CELLS)
            .into_iter()
            .filter(|&r| r > a && r < b),
    );

    let values: Vec<(f64, f64)> =
        candidates.into_iter().filter_map(|x| f.eval(x).map(|y| (x, y))).collect();
    // Strict comparisons keep the earliest candidate on ties
    let mut min = *values.first()?;
    let mut max = min;
    for &(x, y) in &values[1..] {
        if y < min.1 {
            min = (x, y);
        }
        if y > max.1 {
            max = (x, y);
        }
    }

    let v = &f.variable;
    let (min_x, min_y) = (fmt_num(min.0), fmt_num(min.1));
    let (max_x, max_y) = (fmt_num(max.0), fmt_num(max.1));
    Some(SolverResult::new(
        format!("Absolute min at {v}={min_x}, f={min_y}; absolute max at {v}={max_x}, f={max_y}"),
        format!(
            "\\text{{min at }} {v}={min_x},\\ f={min_y};\\ \\text{{max at }} {v}={max_x},\\ f={max_y}"
        ),
    ))
}
