// AST evaluation and polynomial coefficient extraction

use std::f64::consts::{E, PI};

use super::parser::{Expr, Func, Op};

/// Evaluate `expr` with `var` bound to `value`.
/// Unknown identifiers and non-finite results yield `None`.
pub fn eval_expr(expr: &Expr, var: &str, value: f64) -> Option<f64> {
    let v = eval_node(expr, var, value)?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

fn eval_node(expr: &Expr, var: &str, value: f64) -> Option<f64> {
    match expr {
        Expr::Number(n) => Some(*n),
        Expr::Ident(name) => resolve_ident(name, var, value),
        Expr::Neg(inner) => Some(-eval_node(inner, var, value)?),
        Expr::BinaryOp { op, left, right } => {
            let l = eval_node(left, var, value)?;
            let r = eval_node(right, var, value)?;
            Some(match op {
                Op::Add => l + r,
                Op::Sub => l - r,
                Op::Mul => l * r,
                Op::Div => l / r,
                Op::Pow => l.powf(r),
            })
        }
        Expr::Call { func, args } => {
            let a = eval_node(args.first()?, var, value)?;
            Some(match func {
                Func::Sqrt => a.sqrt(),
                Func::Ln => a.ln(),
                Func::Exp => a.exp(),
                Func::Pow => a.powf(eval_node(args.get(1)?, var, value)?),
            })
        }
    }
}

fn resolve_ident(name: &str, var: &str, value: f64) -> Option<f64> {
    if name == var {
        return Some(value);
    }
    match name {
        "e" => Some(E),
        "pi" => Some(PI),
        _ => None,
    }
}

/// Highest exponent expanded when reading an expression as a polynomial.
const MAX_EXPANDED_POWER: usize = 8;

/// Coefficients (constant term first) when `expr` is a polynomial in `var`
/// with non-negative integer powers. Trailing zero coefficients are trimmed.
pub fn polynomial_coefficients(expr: &Expr, var: &str) -> Option<Vec<f64>> {
    let mut coeffs = poly_node(expr, var)?;
    while coeffs.len() > 1 && coeffs.last() == Some(&0.0) {
        coeffs.pop();
    }
    Some(coeffs)
}

fn poly_node(expr: &Expr, var: &str) -> Option<Vec<f64>> {
    match expr {
        Expr::Number(n) => Some(vec![*n]),
        Expr::Ident(name) if name == var => Some(vec![0.0, 1.0]),
        Expr::Ident(name) => resolve_ident(name, var, 0.0).map(|c| vec![c]),
        Expr::Neg(inner) => Some(poly_node(inner, var)?.into_iter().map(|c| -c).collect()),
        Expr::BinaryOp { op, left, right } => {
            let l = poly_node(left, var)?;
            let r = poly_node(right, var)?;
            match op {
                Op::Add => Some(poly_add(&l, &r, 1.0)),
                Op::Sub => Some(poly_add(&l, &r, -1.0)),
                Op::Mul => Some(poly_mul(&l, &r)),
                Op::Div => {
                    let d = constant_of(&r)?;
                    if d == 0.0 {
                        return None;
                    }
                    Some(l.into_iter().map(|c| c / d).collect())
                }
                Op::Pow => {
                    let n = constant_of(&r)?;
                    if n < 0.0 || n.fract() != 0.0 || n as usize > MAX_EXPANDED_POWER {
                        return None;
                    }
                    let mut acc = vec![1.0];
                    for _ in 0..n as usize {
                        acc = poly_mul(&acc, &l);
                    }
                    Some(acc)
                }
            }
        }
        Expr::Call { .. } => None,
    }
}

fn constant_of(p: &[f64]) -> Option<f64> {
    if p.iter().skip(1).all(|&c| c == 0.0) {
        p.first().copied()
    } else {
        None
    }
}

fn poly_add(a: &[f64], b: &[f64], sign: f64) -> Vec<f64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| a.get(i).copied().unwrap_or(0.0) + sign * b.get(i).copied().unwrap_or(0.0))
        .collect()
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;

    fn ev(s: &str, x: f64) -> Option<f64> {
        eval_expr(&parse(s).unwrap(), "x", x)
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eq!(ev("x^2 - 4x + 3", 2.0), Some(-1.0));
        assert_eq!(ev("-x^2", 3.0), Some(-9.0));
        assert_eq!(ev("2^3^2", 0.0), Some(512.0));
    }

    #[test]
    fn test_eval_functions() {
        assert_eq!(ev("sqrt(x)", 9.0), Some(3.0));
        assert!((ev("ln(e)", 0.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(ev("exp(0)", 0.0), Some(1.0));
        assert_eq!(ev("pow(x, 3)", 2.0), Some(8.0));
    }

    #[test]
    fn test_eval_non_finite_is_none() {
        assert_eq!(ev("1/x", 0.0), None);
        assert_eq!(ev("sqrt(x)", -1.0), None);
        assert_eq!(ev("ln(x)", 0.0), None);
    }

    #[test]
    fn test_eval_unbound_identifier_is_none() {
        assert_eq!(ev("y + 1", 0.0), None);
    }

    #[test]
    fn test_polynomial_coefficients() {
        let e = parse("x^3 - 3x").unwrap();
        assert_eq!(polynomial_coefficients(&e, "x"), Some(vec![0.0, -3.0, 0.0, 1.0]));
        let e = parse("(x+1)^2/2").unwrap();
        assert_eq!(polynomial_coefficients(&e, "x"), Some(vec![0.5, 1.0, 0.5]));
    }

    #[test]
    fn test_polynomial_rejects_non_polynomials() {
        assert_eq!(polynomial_coefficients(&parse("sqrt(x)").unwrap(), "x"), None);
        assert_eq!(polynomial_coefficients(&parse("1/x").unwrap(), "x"), None);
        assert_eq!(polynomial_coefficients(&parse("x^0.5").unwrap(), "x"), None);
    }
}
