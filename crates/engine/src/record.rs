// Question records - one CSV row / one flashcard question

use std::collections::HashMap;

/// Recognized columns, in the order they are appended when missing from a header.
pub const COLUMNS: [&str; 10] = [
    "cluster",
    "topic",
    "id",
    "questionText",
    "questionLatex",
    "hint",
    "answer",
    "answerLatex",
    "solutionText",
    "solutionLatex",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionRecord {
    pub cluster: String,
    pub topic: String,
    pub id: String,
    pub question_text: String,
    pub question_latex: String,
    pub hint: String,
    pub answer: String,
    pub answer_latex: String,
    pub solution_text: String,
    pub solution_latex: String,
    /// Columns outside the recognized set, carried through untouched.
    pub extra: HashMap<String, String>,
}

impl QuestionRecord {
    /// Build a record from a header-keyed field map. Unknown columns land in `extra`.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let mut record = Self::default();
        for (name, value) in fields {
            match record.field_mut(name) {
                Some(slot) => *slot = value.clone(),
                None => {
                    record.extra.insert(name.clone(), value.clone());
                }
            }
        }
        record
    }

    /// Value of a column by header name; empty for unknown columns.
    pub fn get(&self, name: &str) -> &str {
        match name {
            "cluster" => &self.cluster,
            "topic" => &self.topic,
            "id" => &self.id,
            "questionText" => &self.question_text,
            "questionLatex" => &self.question_latex,
            "hint" => &self.hint,
            "answer" => &self.answer,
            "answerLatex" => &self.answer_latex,
            "solutionText" => &self.solution_text,
            "solutionLatex" => &self.solution_latex,
            other => self.extra.get(other).map(String::as_str).unwrap_or(""),
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "cluster" => Some(&mut self.cluster),
            "topic" => Some(&mut self.topic),
            "id" => Some(&mut self.id),
            "questionText" => Some(&mut self.question_text),
            "questionLatex" => Some(&mut self.question_latex),
            "hint" => Some(&mut self.hint),
            "answer" => Some(&mut self.answer),
            "answerLatex" => Some(&mut self.answer_latex),
            "solutionText" => Some(&mut self.solution_text),
            "solutionLatex" => Some(&mut self.solution_latex),
            _ => None,
        }
    }

    /// Fields in header order, ready for serialization.
    pub fn to_fields(&self, headers: &[String]) -> Vec<String> {
        headers.iter().map(|h| self.get(h).to_string()).collect()
    }

    /// True when either answer column carries non-whitespace content.
    pub fn has_answer(&self) -> bool {
        !is_blank(&self.answer) || !is_blank(&self.answer_latex)
    }

    /// Prose followed by markup, the haystack most solvers search.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.question_text, self.question_latex)
    }
}

/// Answer produced by a topic solver: plain text plus markup form.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub answer: String,
    pub answer_latex: String,
}

impl SolverResult {
    pub fn new(answer: impl Into<String>, answer_latex: impl Into<String>) -> Self {
        Self { answer: answer.into(), answer_latex: answer_latex.into() }
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_from_fields_routes_known_and_extra_columns() {
        let rec = QuestionRecord::from_fields(&fields(&[
            ("cluster", "Concepts of Economics"),
            ("questionText", "Find C'(10)."),
            ("difficulty", "hard"),
        ]));
        assert_eq!(rec.cluster, "Concepts of Economics");
        assert_eq!(rec.question_text, "Find C'(10).");
        assert_eq!(rec.get("difficulty"), "hard");
        assert_eq!(rec.get("nonexistent"), "");
    }

    #[test]
    fn test_to_fields_follows_header_order() {
        let rec = QuestionRecord::from_fields(&fields(&[("id", "7"), ("topic", "Marginal Cost")]));
        let headers = vec!["topic".to_string(), "answer".to_string(), "id".to_string()];
        assert_eq!(rec.to_fields(&headers), vec!["Marginal Cost", "", "7"]);
    }

    #[test]
    fn test_has_answer_ignores_whitespace() {
        let mut rec = QuestionRecord::default();
        rec.answer = "   ".into();
        assert!(!rec.has_answer());
        rec.answer_latex = "x=2".into();
        assert!(rec.has_answer());
    }
}
