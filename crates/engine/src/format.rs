// Number formatting for generated answers

/// Round to `digits` decimal places (half away from zero).
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Round to 6 decimals and print in shortest form: `2`, `-0.285714`, `0.666667`.
/// Negative zero prints as `0`.
pub fn fmt_num(value: f64) -> String {
    let r = round_to(value, 6);
    if r == 0.0 {
        return "0".to_string();
    }
    format!("{}", r)
}

/// Print a value exactly as given (no rounding), with `-0` folded to `0`.
/// Used for grid coordinates that are already short decimals.
pub fn fmt_exact(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_integers_have_no_fraction() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(-1.0), "-1");
    }

    #[test]
    fn test_fmt_num_rounds_to_six_places() {
        assert_eq!(fmt_num(2.0 / 3.0), "0.666667");
        assert_eq!(fmt_num(-6.0 / 21.0), "-0.285714");
    }

    #[test]
    fn test_fmt_num_folds_negative_zero() {
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(-1e-9), "0");
    }

    #[test]
    fn test_fmt_exact_keeps_grid_points() {
        assert_eq!(fmt_exact(-0.5), "-0.5");
        assert_eq!(fmt_exact(5.0), "5");
    }
}
