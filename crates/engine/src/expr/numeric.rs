// Finite differences, bisection, and grid root scanning

use super::eval::eval_expr;
use super::parser::parse;

/// Step for the central first difference.
pub const FIRST_DIFF_STEP: f64 = 1e-5;
/// Step for the central second difference.
pub const SECOND_DIFF_STEP: f64 = 1e-4;
/// Bisection refinements per detected sign change.
pub const BISECTION_ITERATIONS: usize = 28;

/// Parse `expr` and evaluate it at `value`. Any parse or evaluation failure is `None`.
pub fn evaluate(expr: &str, var: &str, value: f64) -> Option<f64> {
    let ast = parse(expr).ok()?;
    eval_expr(&ast, var, value)
}

/// Central first difference of `expr` at `x`.
pub fn first_derivative(expr: &str, var: &str, x: f64) -> Option<f64> {
    let ast = parse(expr).ok()?;
    central_first(|v| eval_expr(&ast, var, v), x)
}

/// Central second difference of `expr` at `x`.
pub fn second_derivative(expr: &str, var: &str, x: f64) -> Option<f64> {
    let ast = parse(expr).ok()?;
    central_second(|v| eval_expr(&ast, var, v), x)
}

pub fn central_first(f: impl Fn(f64) -> Option<f64>, x: f64) -> Option<f64> {
    let h = FIRST_DIFF_STEP;
    let hi = f(x + h)?;
    let lo = f(x - h)?;
    Some((hi - lo) / (2.0 * h))
}

pub fn central_second(f: impl Fn(f64) -> Option<f64>, x: f64) -> Option<f64> {
    let h = SECOND_DIFF_STEP;
    let hi = f(x + h)?;
    let mid = f(x)?;
    let lo = f(x - h)?;
    Some((hi - 2.0 * mid + lo) / (h * h))
}

/// Narrow a sign change of `g` inside `[lo, hi]`. Stops early if `g` becomes undefined.
pub fn bisect(g: impl Fn(f64) -> Option<f64>, lo: f64, hi: f64) -> f64 {
    let (mut l, mut r) = (lo, hi);
    for _ in 0..BISECTION_ITERATIONS {
        let m = (l + r) / 2.0;
        let (Some(gl), Some(gm)) = (g(l), g(m)) else {
            break;
        };
        if gl * gm <= 0.0 {
            r = m;
        } else {
            l = m;
        }
    }
    (l + r) / 2.0
}

/// Roots of `g` on `[lo, hi]` split into `cells` equal cells: grid nodes where `g`
/// is exactly zero plus one bisected root per cell with a strict sign change.
/// Cells where `g` is undefined at either end are skipped.
pub fn scan_roots(g: impl Fn(f64) -> Option<f64>, lo: f64, hi: f64, cells: usize) -> Vec<f64> {
    let step = (hi - lo) / cells as f64;
    let node = |i: usize| if i == cells { hi } else { lo + i as f64 * step };

    let mut roots = Vec::new();
    for i in 0..cells {
        let (a, b) = (node(i), node(i + 1));
        let (Some(ga), Some(gb)) = (g(a), g(b)) else {
            continue;
        };
        if ga == 0.0 {
            roots.push(a);
        }
        if ga * gb < 0.0 {
            roots.push(bisect(&g, a, b));
        }
    }
    if g(hi) == Some(0.0) {
        roots.push(hi);
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_evaluate_string() {
        assert_eq!(evaluate("3x^2 + 5", "x", 2.0), Some(17.0));
        assert_eq!(evaluate("3x^2 +", "x", 2.0), None);
    }

    #[test]
    fn test_first_derivative() {
        let d = first_derivative("x^3", "x", 2.0).unwrap();
        assert!(close(d, 12.0, 1e-6), "got {d}");
    }

    #[test]
    fn test_second_derivative() {
        let d = second_derivative("x^3 - 3x", "x", 1.0).unwrap();
        assert!(close(d, 6.0, 1e-3), "got {d}");
    }

    #[test]
    fn test_derivative_undefined_nearby() {
        assert_eq!(first_derivative("sqrt(x)", "x", 0.0), None);
    }

    #[test]
    fn test_scan_roots_finds_sign_changes() {
        let roots = scan_roots(|x| Some(x * x - 2.0), -5.0, 5.0, 20);
        assert_eq!(roots.len(), 2);
        assert!(close(roots[0], -2f64.sqrt(), 1e-6));
        assert!(close(roots[1], 2f64.sqrt(), 1e-6));
    }

    #[test]
    fn test_scan_roots_exact_node_zero() {
        let roots = scan_roots(|x| Some(x - 1.0), -5.0, 5.0, 20);
        assert_eq!(roots, vec![1.0]);
    }

    #[test]
    fn test_scan_roots_skips_undefined_cells() {
        let roots = scan_roots(|x| if x < 0.0 { None } else { Some(x - 2.25) }, -5.0, 5.0, 20);
        assert_eq!(roots.len(), 1);
        assert!(close(roots[0], 2.25, 1e-6));
    }
}
