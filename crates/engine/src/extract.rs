// Math-span extraction: lift embedded equations out of question prose
//
// Candidates come from three pattern families plus a semicolon split of the
// original text. Each candidate is trimmed of trailing domain and unit clauses
// before being kept; the statement it came from is then cut out of the prose.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup::normalize_whitespace;

/// Comparison operators recognized between the sides of a statement.
const CMP: &str = r"(?:<=|>=|≤|≥|=|<|>)";

/// Function application: `C(x) = ...`, `f(t) >= ...`
static FUNCTION_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b[A-Za-z]\s*\(\s*[a-zA-Z]\s*\)\s*{CMP}\s*[^;]+")).unwrap()
});
/// Bare identifier relation: `p = ...`, `x >= ...`, `p0 = ...`
static VARIABLE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b[a-zA-Z][a-zA-Z0-9]*\s*{CMP}\s*[^;]+")).unwrap()
});
/// Numeric-bounded chain: `0 <= x <= 40`
static BOUNDED_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    let bound = r"-?\d+(?:\.\d+)?";
    let op = r"(?:≤|≥|>=|<=|<|>)";
    Regex::new(&format!(r"{bound}\s*{op}\s*[a-zA-Z][a-zA-Z0-9]*\s*{op}\s*{bound}")).unwrap()
});

static LEADING_CONNECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(is|be|given by|equals)\s+").unwrap());
static WHERE_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,?\s*\bwhere\b.*$").unwrap());
static DOMAIN_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s*\(\s*[-\d\s.]*\s*(?:≤|≥|>=|<=|<|>)\s*[a-zA-Z][a-zA-Z0-9]*\s*(?:≤|≥|>=|<=|<|>)\s*[-\d\s.]*\)\s*$",
    )
    .unwrap()
});
static UNIT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(dollars|units|boxes|people|per\s+week|per\s+month)\s*$").unwrap()
});
static SOLD_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*prints will be sold.*$").unwrap());
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+[A-Z]").unwrap());
static TRAILING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,.;:]+$").unwrap());
static ONLY_WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

static SEGMENT_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=|<=|>=|≤|≥|sqrt\(|\^").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:?])").unwrap());
static DOUBLED_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([,;:])([.?])").unwrap());
static EDGE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s,;:.]+|[\s,;]+$").unwrap());

/// Residual prose plus the math statements lifted out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub clean_text: String,
    /// Trimmed statements in discovery order, without duplicates
    pub math_parts: Vec<String>,
}

/// Pull equation-like statements out of `text`.
pub fn extract_math_from_text(text: &str) -> Extraction {
    let mut parts: Vec<String> = Vec::new();
    // Prose spans to delete, one per kept candidate
    let mut spans: Vec<(String, String)> = Vec::new();

    let mut consider = |raw: &str| {
        let span = cut_sentence(raw).trim().to_string();
        let candidate = LEADING_CONNECTIVE.replace(raw.trim(), "");
        let trimmed = trim_trailing_clauses(&candidate);
        if trimmed.is_empty() || ONLY_WORDS.is_match(&trimmed) {
            return;
        }
        if !parts.contains(&trimmed) {
            parts.push(trimmed.clone());
        }
        if !spans.iter().any(|(s, _)| *s == span) {
            spans.push((span, trimmed));
        }
    };

    for re in [&*FUNCTION_STATEMENT, &*VARIABLE_STATEMENT, &*BOUNDED_CHAIN] {
        for m in re.find_iter(text) {
            consider(m.as_str());
        }
    }

    let segments: Vec<&str> = text.split(';').collect();
    if segments.len() > 1 {
        for seg in segments {
            if SEGMENT_MATH.is_match(seg) {
                consider(seg.trim());
            }
        }
    }

    // Longest first so a statement is removed before any fragment of it
    spans.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let mut remaining = text.to_string();
    for (span, trimmed) in &spans {
        if !remove_once(&mut remaining, span) {
            remove_once(&mut remaining, trimmed);
        }
    }

    let tidy = normalize_whitespace(&remaining);
    let tidy = SPACE_BEFORE_PUNCT.replace_all(&tidy, "$1");
    let tidy = DOUBLED_PUNCT.replace_all(&tidy, "$2");
    let tidy = EDGE_PUNCT.replace_all(&tidy, "");
    Extraction { clean_text: tidy.into_owned(), math_parts: parts }
}

/// Strip trailing `where` clauses, parenthesized domains, unit words, sentence
/// continuations, and punctuation from a math statement.
pub fn trim_trailing_clauses(s: &str) -> String {
    let out = s.trim();
    let out = WHERE_CLAUSE.replace(out, "");
    let out = DOMAIN_CLAUSE.replace(&out, "");
    let out = UNIT_WORDS.replace(&out, "");
    let out = SOLD_CLAUSE.replace(&out, "");
    let out = cut_sentence(&out);
    TRAILING_PUNCT.replace(out, "").trim().to_string()
}

fn cut_sentence(s: &str) -> &str {
    match SENTENCE_BREAK.find(s) {
        Some(m) => &s[..m.start()],
        None => s,
    }
}

/// Delete the first whitespace-tolerant occurrence of `needle`.
fn remove_once(haystack: &mut String, needle: &str) -> bool {
    let tokens: Vec<String> = needle.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return false;
    }
    let Ok(re) = Regex::new(&format!(r"\s*{}\s*", tokens.join(r"\s*"))) else {
        return false;
    };
    let Some(m) = re.find(haystack) else {
        return false;
    };
    let range = m.range();
    haystack.replace_range(range, " ");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_statement_with_where_clause() {
        let out = extract_math_from_text("The cost is C(x) = 3x^2 + 5, where x >= 0.");
        assert_eq!(out.clean_text, "The cost is");
        assert!(out.math_parts.contains(&"C(x) = 3x^2 + 5".to_string()));
        assert!(out.math_parts.iter().all(|p| !p.contains("where")));
    }

    #[test]
    fn test_sentence_continuation_kept_in_prose() {
        let out = extract_math_from_text("Let f(x) = x^2 - 4x + 3. Find the relative extrema.");
        assert_eq!(out.math_parts, vec!["f(x) = x^2 - 4x + 3".to_string()]);
        assert_eq!(out.clean_text, "Let. Find the relative extrema.");
    }

    #[test]
    fn test_bounded_chain_and_units() {
        let out = extract_math_from_text("Profit P(x) = 20x - 100 dollars (0 <= x <= 40)");
        assert!(out.math_parts.contains(&"P(x) = 20x - 100".to_string()));
        assert!(out.math_parts.contains(&"0 <= x <= 40".to_string()));
        assert_eq!(out.clean_text, "Profit");
    }

    #[test]
    fn test_semicolon_segments() {
        let out = extract_math_from_text("p = 100 - 2x; x^2 + y^2");
        assert!(out.math_parts.contains(&"p = 100 - 2x".to_string()));
        assert!(out.math_parts.contains(&"x^2 + y^2".to_string()));
        assert_eq!(out.clean_text, "");
    }

    #[test]
    fn test_plain_prose_untouched() {
        let out = extract_math_from_text("What  is a derivative?");
        assert!(out.math_parts.is_empty());
        assert_eq!(out.clean_text, "What is a derivative?");
    }

    #[test]
    fn test_duplicate_statements_kept_once() {
        let out = extract_math_from_text("x = 5; x = 5");
        assert_eq!(out.math_parts, vec!["x = 5".to_string()]);
    }

    #[test]
    fn test_trim_trailing_clauses() {
        assert_eq!(trim_trailing_clauses("x = 3p + 2 units"), "x = 3p + 2");
        assert_eq!(trim_trailing_clauses("C(x) = 5x (0 <= x <= 15)"), "C(x) = 5x");
        assert_eq!(trim_trailing_clauses("is p = 4, where p is price"), "is p = 4");
        assert_eq!(trim_trailing_clauses("x = 2. Find y"), "x = 2");
        assert_eq!(trim_trailing_clauses("x = 0.5;"), "x = 0.5");
    }
}
