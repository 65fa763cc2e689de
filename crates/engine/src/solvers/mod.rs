// Topic solvers and the registry that routes rows to them
//
// Entries are tried in registry order. The first entry whose predicate accepts
// the row and whose solver returns a result wins. Predicates are disjoint except
// where a later entry is a documented fallback for an earlier one (relative
// extrema after absolute extrema).

pub mod concavity;
pub mod elasticity;
pub mod extrema;
pub mod marginal;
pub mod related_rates;
pub mod revenue;

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::record::{QuestionRecord, SolverResult};

pub const ECONOMICS_CLUSTER: &str = "Concepts of Economics";
pub const EXTREMA_CLUSTER: &str = "Maximum and Minimum Values";
pub const EXTREMA_TOPIC: &str = "Maxima and Minima";
pub const SECOND_DERIVATIVE_CLUSTER: &str = "Applications of the Second Derivative";

static RELATED_RATES_TOPIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)related rates").unwrap());
static ELASTICITY_TOPIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)elasticity|demand").unwrap());

pub type Predicate = fn(&QuestionRecord) -> bool;
pub type SolveFn = fn(&QuestionRecord) -> Option<SolverResult>;

/// One routing rule: which rows it claims and how it answers them.
#[derive(Clone, Copy)]
pub struct SolverEntry {
    pub name: &'static str,
    pub applies: Predicate,
    pub solve: SolveFn,
}

impl std::fmt::Debug for SolverEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverEntry").field("name", &self.name).finish()
    }
}

/// All solvers in priority order.
pub const REGISTRY: &[SolverEntry] = &[
    SolverEntry { name: "marginal-cost", applies: is_marginal, solve: marginal::solve },
    SolverEntry { name: "related-rates", applies: is_related_rates, solve: related_rates::solve },
    SolverEntry { name: "elasticity", applies: is_elasticity, solve: elasticity::solve },
    SolverEntry { name: "revenue", applies: is_revenue, solve: revenue::solve },
    SolverEntry {
        name: "absolute-extrema",
        applies: is_absolute_extrema,
        solve: extrema::solve_absolute,
    },
    SolverEntry {
        name: "relative-extrema",
        applies: is_extrema_topic,
        solve: extrema::solve_relative,
    },
    SolverEntry { name: "concavity", applies: is_concavity, solve: concavity::solve },
    SolverEntry {
        name: "second-derivative-test",
        applies: is_second_derivative_test,
        solve: extrema::solve_second_derivative_test,
    },
];

/// Run the registry against a row. Returns the winning entry's name and result.
pub fn solve(row: &QuestionRecord) -> Option<(&'static str, SolverResult)> {
    for entry in REGISTRY {
        if !(entry.applies)(row) {
            continue;
        }
        match (entry.solve)(row) {
            Some(result) => {
                debug!("row {:?}: answered by {}", row.id, entry.name);
                return Some((entry.name, result));
            }
            None => debug!("row {:?}: {} found no answer", row.id, entry.name),
        }
    }
    None
}

// ============================================================================
// Predicates
// ============================================================================

fn is_economics(row: &QuestionRecord) -> bool {
    row.cluster.contains(ECONOMICS_CLUSTER)
}

pub fn is_marginal(row: &QuestionRecord) -> bool {
    is_economics(row) && row.topic.contains("Marginal")
}

pub fn is_related_rates(row: &QuestionRecord) -> bool {
    is_economics(row) && !is_marginal(row) && RELATED_RATES_TOPIC.is_match(&row.topic)
}

pub fn is_elasticity(row: &QuestionRecord) -> bool {
    is_economics(row)
        && !is_marginal(row)
        && !is_related_rates(row)
        && ELASTICITY_TOPIC.is_match(&row.topic)
}

/// Economics rows no specific solver claims.
pub fn is_revenue(row: &QuestionRecord) -> bool {
    is_economics(row) && !is_marginal(row) && !is_related_rates(row) && !is_elasticity(row)
}

pub fn is_extrema_topic(row: &QuestionRecord) -> bool {
    row.cluster.contains(EXTREMA_CLUSTER) && row.topic.contains(EXTREMA_TOPIC)
}

pub fn is_absolute_extrema(row: &QuestionRecord) -> bool {
    is_extrema_topic(row) && extrema::closed_interval(row).is_some()
}

pub fn is_concavity(row: &QuestionRecord) -> bool {
    row.cluster.contains(SECOND_DERIVATIVE_CLUSTER) && row.topic.contains("Concavity")
}

pub fn is_second_derivative_test(row: &QuestionRecord) -> bool {
    row.cluster.contains(SECOND_DERIVATIVE_CLUSTER) && row.topic.contains("Second Derivative Test")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cluster: &str, topic: &str, latex: &str, text: &str) -> QuestionRecord {
        QuestionRecord {
            cluster: cluster.to_string(),
            topic: topic.to_string(),
            question_latex: latex.to_string(),
            question_text: text.to_string(),
            ..Default::default()
        }
    }

    fn claimants(r: &QuestionRecord) -> Vec<&'static str> {
        REGISTRY.iter().filter(|e| (e.applies)(r)).map(|e| e.name).collect()
    }

    #[test]
    fn test_registry_order() {
        let names: Vec<_> = REGISTRY.iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                "marginal-cost",
                "related-rates",
                "elasticity",
                "revenue",
                "absolute-extrema",
                "relative-extrema",
                "concavity",
                "second-derivative-test",
            ]
        );
    }

    #[test]
    fn test_economics_predicates_are_disjoint() {
        let topics = ["Marginal Analysis", "Related Rates", "Elasticity of Demand", "Revenue"];
        for topic in topics {
            let r = row(ECONOMICS_CLUSTER, topic, "", "");
            assert_eq!(claimants(&r).len(), 1, "{topic}: {:?}", claimants(&r));
        }
        let r = row(ECONOMICS_CLUSTER, "Marginal Demand", "", "");
        assert_eq!(claimants(&r), vec!["marginal-cost"]);
    }

    #[test]
    fn test_interval_routes_to_absolute_first() {
        let r = row(EXTREMA_CLUSTER, "Relative Maxima and Minima", "f(x) = x^2", "on [-1, 2]");
        assert_eq!(claimants(&r), vec!["absolute-extrema", "relative-extrema"]);
        let (name, _) = solve(&r).unwrap();
        assert_eq!(name, "absolute-extrema");
    }

    #[test]
    fn test_relative_without_interval() {
        let r = row(EXTREMA_CLUSTER, "Relative Maxima and Minima", "f(x) = x^2 - 4x + 3", "");
        let (name, result) = solve(&r).unwrap();
        assert_eq!(name, "relative-extrema");
        assert_eq!(result.answer, "relative minimum at x=2, f=-1");
    }

    #[test]
    fn test_unrouted_rows() {
        let r = row("Limits", "Continuity", "f(x) = x^2", "");
        assert!(claimants(&r).is_empty());
        assert!(solve(&r).is_none());
    }

    #[test]
    fn test_second_derivative_topics() {
        let r = row(SECOND_DERIVATIVE_CLUSTER, "Concavity and Inflection", "", "");
        assert_eq!(claimants(&r), vec!["concavity"]);
        let r = row(SECOND_DERIVATIVE_CLUSTER, "The Second Derivative Test", "", "");
        assert_eq!(claimants(&r), vec!["second-derivative-test"]);
    }
}
