// Related rates for a fixed library of textbook relations
//
// Each relation is recognized by its literal text and answered from its
// implicitly differentiated form with the problem's known values.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::format::fmt_num;
use crate::record::{QuestionRecord, SolverResult};

struct Relation {
    name: &'static str,
    matches: fn(&str) -> bool,
    answer: fn() -> SolverResult,
}

static CUBIC_SUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"x\^3\s*\+\s*y\s*=\s*1").unwrap());
static Y_IS_ONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"y\s*=\s*1").unwrap());
static QUARTIC_PRODUCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xy\s*=\s*y\^4\s*-\s*x").unwrap());
static SUPPLY_QUADRATIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"2p\s*\+\s*3x\^2\s*=\s*247").unwrap());
static DEMAND_HYPERBOLA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"576\s*p\^2\s*[−-]\s*x\^2\s*=\s*92").unwrap());
static PRICE_QUADRATIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"p\s*=\s*-0\.02x\^2\s*-\s*0\.1x\s*\+\s*10").unwrap());

const RELATIONS: &[Relation] = &[
    Relation { name: "x^3 + y = 1", matches: cubic_sum, answer: cubic_sum_rate },
    Relation { name: "xy = y^4 - x", matches: quartic_product, answer: quartic_product_rate },
    Relation { name: "2p + 3x^2 = 247", matches: supply_quadratic, answer: supply_quadratic_rate },
    Relation {
        name: "576p^2 - x^2 = 92",
        matches: demand_hyperbola,
        answer: demand_hyperbola_rate,
    },
    Relation {
        name: "p = -0.02x^2 - 0.1x + 10",
        matches: price_quadratic,
        answer: price_elasticity,
    },
];

fn rate(symbol: &str, value: f64, suffix: &str) -> SolverResult {
    let v = fmt_num(value);
    SolverResult::new(
        format!("d{symbol}/dt = {v}{suffix}"),
        format!("\\dfrac{{d{symbol}}}{{dt}} = {v}"),
    )
}

// x^3 + y = 1 with y' = 3 at x = -1:  3x^2 x' + y' = 0
fn cubic_sum(t: &str) -> bool {
    CUBIC_SUM.is_match(t) || (t.contains("x^3") && Y_IS_ONE.is_match(t))
}

fn cubic_sum_rate() -> SolverResult {
    let (x, dydt) = (-1.0_f64, 3.0);
    rate("x", -dydt / (3.0 * x * x), " at t=0")
}

// xy = y^4 - x with x' = 7 at (0.5, 1):  x'y + xy' = 4y^3 y' - x'
fn quartic_product(t: &str) -> bool {
    QUARTIC_PRODUCT.is_match(t)
}

fn quartic_product_rate() -> SolverResult {
    let (x, y, dxdt) = (0.5_f64, 1.0_f64, 7.0);
    rate("y", -(dxdt * (1.0 + y)) / (x - 4.0 * y.powi(3)), "")
}

// 2p + 3x^2 = 247 with p' = 6 at x = 7:  2p' + 6x x' = 0
fn supply_quadratic(t: &str) -> bool {
    SUPPLY_QUADRATIC.is_match(t)
}

fn supply_quadratic_rate() -> SolverResult {
    let (x, dpdt) = (7.0, 6.0);
    rate("x", -dpdt / (3.0 * x), " (thousand units per month)")
}

// 576p^2 - x^2 = 92 with x' = -0.8 at x = 22, p = 1:  1152p p' - 2x x' = 0
fn demand_hyperbola(t: &str) -> bool {
    DEMAND_HYPERBOLA.is_match(t)
}

fn demand_hyperbola_rate() -> SolverResult {
    let (x, dxdt, p) = (22.0, -0.8, 1.0);
    rate("p", (x * dxdt) / (576.0 * p), " dollars per week")
}

// Elasticity of p = -0.02x^2 - 0.1x + 10 at x = 10
fn price_quadratic(t: &str) -> bool {
    PRICE_QUADRATIC.is_match(t)
}

fn price_elasticity() -> SolverResult {
    let x: f64 = 10.0;
    let p = -0.02 * x * x - 0.1 * x + 10.0;
    let dpdx = -0.04 * x - 0.1;
    let e = fmt_num(-(x / p) * dpdx);
    SolverResult::new(format!("E(10) = {e} (inelastic)"), format!("E(10) = {e}"))
}

pub fn solve(row: &QuestionRecord) -> Option<SolverResult> {
    let text = row.combined_text();
    let relation = RELATIONS.iter().find(|r| (r.matches)(&text))?;
    debug!("row {:?}: related-rates relation {}", row.id, relation.name);
    Some((relation.answer)())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(text: &str, latex: &str) -> QuestionRecord {
        QuestionRecord {
            question_text: text.to_string(),
            question_latex: latex.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cubic_sum() {
        let r = solve(&rates("Suppose x^3 + y = 1 and dy/dt = 3", "")).unwrap();
        assert_eq!(r.answer, "dx/dt = -1 at t=0");
        assert_eq!(r.answer_latex, "\\dfrac{dx}{dt} = -1");
    }

    #[test]
    fn test_cubic_sum_split_across_fields() {
        let r = solve(&rates("Given x^3 in the relation", "y = 1")).unwrap();
        assert_eq!(r.answer, "dx/dt = -1 at t=0");
    }

    #[test]
    fn test_quartic_product() {
        let r = solve(&rates("", "xy = y^4 - x")).unwrap();
        assert_eq!(r.answer, "dy/dt = 4");
    }

    #[test]
    fn test_supply_quadratic() {
        let r = solve(&rates("The supply equation is", "2p + 3x^2 = 247")).unwrap();
        assert_eq!(r.answer, "dx/dt = -0.285714 (thousand units per month)");
        assert_eq!(r.answer_latex, "\\dfrac{dx}{dt} = -0.285714");
    }

    #[test]
    fn test_demand_hyperbola_with_unicode_minus() {
        let r = solve(&rates("576 p^2 − x^2 = 92", "")).unwrap();
        assert_eq!(r.answer, "dp/dt = -0.030556 dollars per week");
    }

    #[test]
    fn test_price_quadratic_elasticity() {
        let r = solve(&rates("", "p = -0.02x^2 - 0.1x + 10")).unwrap();
        assert_eq!(r.answer, "E(10) = 0.714286 (inelastic)");
        assert_eq!(r.answer_latex, "E(10) = 0.714286");
    }

    #[test]
    fn test_unknown_relation() {
        assert!(solve(&rates("x^2 + y^2 = 25", "")).is_none());
    }
}
