// Markup normalization - plain math notation to typesetting commands and back
//
// `to_latex_ascii` is order-sensitive: every step assumes the previous ones ran.
// It is idempotent: already-normalized text passes through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static OCR_ISP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^isp\s*=").unwrap());
static CARET_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^\(([^()]+)\)").unwrap());
static WORD_AT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bat\b").unwrap());
static MARKUP_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(frac|sqrt|ln|cup|cap|geq|leq)").unwrap());

/// Normalize plain math notation into markup form.
pub fn to_latex_ascii(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let mut out = OCR_ISP.replace(s, "p = ").into_owned();
    out = out
        .replace('≥', " \\geq ")
        .replace('≤', " \\leq ")
        .replace(">=", " \\geq ")
        .replace("<=", " \\leq ")
        .replace('−', "-");
    out = replace_func_call(&out, "sqrt", &|arg| format!("\\sqrt{{{}}}", arg));
    out = replace_func_call(&out, "ln", &|arg| format!("\\ln\\left({}\\right)", arg));
    // Innermost exponents first; each pass rewrites one nesting level
    while CARET_PARENS.is_match(&out) {
        out = CARET_PARENS.replace_all(&out, "^{$1}").into_owned();
    }
    out = replace_abs_bars(&out);
    out = out.replace('∪', " \\cup ").replace('∩', " \\cap ");
    escape_word_at(&out)
}

/// True when the text already carries markup commands and needs no extraction.
pub fn has_markup_signature(s: &str) -> bool {
    MARKUP_SIGNATURE.is_match(s)
}

/// Collapse runs of whitespace to a single space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrite `name(...)` calls, matching balanced parentheses. The argument is
/// rewritten recursively so nested calls of the same function are handled.
/// A call with no closing parenthesis leaves the rest of the string untouched.
fn replace_func_call(s: &str, name: &str, replacer: &dyn Fn(&str) -> String) -> String {
    let needle = format!("{}(", name);
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        let Some(rel) = s[i..].find(&needle) else {
            out.push_str(&s[i..]);
            break;
        };
        let idx = i + rel;
        out.push_str(&s[i..idx]);
        // `\sqrt(` already carries the command backslash; the replacer adds its own
        if out.ends_with('\\') {
            out.pop();
        }
        let open = idx + name.len();
        match matching_paren(s, open) {
            Some(close) => {
                let inner = replace_func_call(&s[open + 1..close], name, replacer);
                out.push_str(&replacer(&inner));
                i = close + 1;
            }
            None => {
                out.push_str(&s[idx..]);
                break;
            }
        }
    }

    out
}

/// Index of the `)` closing the `(` at `open`, honoring nesting.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `|inner|` -> `\left|inner\right|`. Bars already wrapped in sizing commands are left alone.
fn replace_abs_bars(s: &str) -> String {
    let is_wrapped = |pos: usize| {
        let before = &s[..pos];
        before.ends_with("\\left") || before.ends_with("\\right")
    };
    let bars: Vec<usize> = s.match_indices('|').map(|(i, _)| i).collect();

    let mut out = String::with_capacity(s.len() + 16);
    let mut copied = 0;
    let mut k = 0;
    while k + 1 < bars.len() {
        let (open, close) = (bars[k], bars[k + 1]);
        if is_wrapped(open) || is_wrapped(close) || close == open + 1 {
            k += 1;
            continue;
        }
        out.push_str(&s[copied..open]);
        out.push_str("\\left|");
        out.push_str(&s[open + 1..close]);
        out.push_str("\\right|");
        copied = close + 1;
        k += 2;
    }
    out.push_str(&s[copied..]);
    out
}

/// Standalone `at` -> `\text{ at }`, skipping occurrences already escaped.
fn escape_word_at(s: &str) -> String {
    WORD_AT
        .replace_all(s, |caps: &Captures| {
            let m = caps.get(0).map(|m| (m.start(), m.end()));
            match m {
                Some((start, end))
                    if s[..start].ends_with("\\text{ ") && s[end..].starts_with(" }") =>
                {
                    "at".to_string()
                }
                _ => "\\text{ at }".to_string(),
            }
        })
        .into_owned()
}

// ============================================================================
// Markup -> plain text
// ============================================================================

static FRAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\d?frac\{([^}]+)\}\{([^}]+)\}").unwrap());
static TEXT_CMD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\text\{([^}]*)\}").unwrap());
static LEFT_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\left\s*\(").unwrap());
static RIGHT_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\right\s*\)").unwrap());
static SQRT_CMD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\sqrt\{([^}]+)\}").unwrap());
static LN_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\ln\s*\(([^)]+)\)").unwrap());
static LN_BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\ln\{([^}]+)\}").unwrap());

/// Strip markup commands, leaving readable plain text.
pub fn latex_to_plain(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut t = FRAC.replace_all(s, "($1)/($2)").into_owned();
    t = TEXT_CMD.replace_all(&t, "$1").into_owned();
    t = LEFT_PAREN.replace_all(&t, "(").into_owned();
    t = RIGHT_PAREN.replace_all(&t, ")").into_owned();
    t = t
        .replace("\\left|", "|")
        .replace("\\right|", "|")
        .replace("\\cup", "U")
        .replace("\\cap", "n")
        .replace("\\leq", "<=")
        .replace("\\geq", ">=")
        .replace("\\approx", "≈")
        .replace("\\Rightarrow", "=>")
        .replace("\\rightarrow", "->");
    t = SQRT_CMD.replace_all(&t, "sqrt($1)").into_owned();
    t = LN_PAREN.replace_all(&t, "ln($1)").into_owned();
    t = LN_BRACE.replace_all(&t, "ln($1)").into_owned();
    t = t.replace('\\', "");
    normalize_whitespace(&t)
}
