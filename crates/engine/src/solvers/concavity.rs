// Concavity intervals and inflection points from sampled second derivatives

use crate::expr::numeric::bisect;
use crate::expr::parse_function_expression;
use crate::format::{fmt_exact, fmt_num, round_to};
use crate::record::{QuestionRecord, SolverResult};

const SAMPLES: [f64; 9] = [-5.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 5.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bend {
    Up,
    Down,
}

/// Sample `f''`, form intervals from adjacent same-sign samples, and bisect
/// sign changes into inflection points. Touching intervals of the same bend
/// are merged.
pub fn solve(row: &QuestionRecord) -> Option<SolverResult> {
    let f = parse_function_expression(row)?;
    let signs: Vec<(f64, Option<f64>)> =
        SAMPLES.iter().map(|&x| (x, f.second_derivative(x))).collect();
    if signs.iter().all(|(_, s)| s.is_none()) {
        return None;
    }

    let mut intervals: Vec<(f64, f64, Bend)> = Vec::new();
    let mut inflections = Vec::new();
    for pair in signs.windows(2) {
        let ((a, sa), (b, sb)) = (pair[0], pair[1]);
        let (Some(sa), Some(sb)) = (sa, sb) else { continue };

        let bend = if sa > 0.0 && sb > 0.0 {
            Some(Bend::Up)
        } else if sa < 0.0 && sb < 0.0 {
            Some(Bend::Down)
        } else {
            None
        };
        if let Some(bend) = bend {
            match intervals.last_mut() {
                Some(last) if last.1 == a && last.2 == bend => last.1 = b,
                _ => intervals.push((a, b, bend)),
            }
        }

        if sa * sb < 0.0 {
            let x = bisect(|x| f.second_derivative(x), a, b);
            inflections.push(round_to(x, 6));
        }
    }

    // A sample landing exactly on an inflection shows up as a zero between opposite signs
    for w in signs.windows(3) {
        if let (Some(l), Some(m), Some(r)) = (w[0].1, w[1].1, w[2].1) {
            if m == 0.0 && l * r < 0.0 {
                inflections.push(w[1].0);
            }
        }
    }
    inflections.sort_by(|l, r| l.total_cmp(r));

    let join = |bend: Bend, sep: &str| {
        let parts: Vec<String> = intervals
            .iter()
            .filter(|i| i.2 == bend)
            .map(|&(a, b, _)| format!("({}, {})", fmt_exact(a), fmt_exact(b)))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(sep))
        }
    };
    let points = if inflections.is_empty() {
        None
    } else {
        Some(inflections.iter().map(|&x| fmt_num(x)).collect::<Vec<_>>().join(", "))
    };

    let plain = |s: Option<String>| s.unwrap_or_else(|| "none".to_string());
    let markup = |s: Option<String>| s.unwrap_or_else(|| "\\text{none}".to_string());

    let answer = format!(
        "Concave up on {}; concave down on {}; inflection points at {}",
        plain(join(Bend::Up, " ∪ ")),
        plain(join(Bend::Down, " ∪ ")),
        plain(points.clone()),
    );
    let answer_latex = format!(
        "\\text{{Up on }} {};\\ \\text{{Down on }} {};\\ \\text{{Inflection at }} {}",
        markup(join(Bend::Up, " \\cup ")),
        markup(join(Bend::Down, " \\cup ")),
        markup(points),
    );
    Some(SolverResult::new(answer, answer_latex))
}
