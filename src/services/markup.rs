//! Markup extraction for tagged model output.
//!
//! Every role answers in lightweight XML-ish markup (`<plan>...</plan>`,
//! `<score>...</score>`, ...). Extraction is tolerant: missing fields are
//! simply absent, truncated terminal fields are closed, and prose around a
//! fenced code block is dropped.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Field names recognized in model output.
pub const FIELDS: &[&str] = &[
    "reasoning_steps",
    "final_answer",
    "feedback",
    "score",
    "critical_feedback",
    "revised_plan",
    "solved",
    "plan",
    "code",
    "choice",
];

/// Fields closed automatically when generation stops mid-field.
pub const TERMINAL_FIELDS: &[&str] = &["final_answer", "score"];

/// Score reported when the score field is missing or not an integer.
pub const SCORE_UNAVAILABLE: i64 = -1;

static FIELD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .map(|field| {
            let pattern = format!(r"(?s)<{field}>(.*?)</{field}>");
            (*field, Regex::new(&pattern).expect("field pattern is valid"))
        })
        .collect()
});

// Optional language tag, then the body up to the next closing fence. A
// python tag may share its line with the code; any other tag must end the
// line.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)```(?:(?:python3?|py)\b[ \t]*(?:\r?\n)?|[a-z0-9_+\-]*[ \t]*\r?\n)?([\s\S]*?)```",
    )
    .expect("fence pattern is valid")
});

/// Fields parsed out of one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    fields: BTreeMap<String, String>,
}

impl Markup {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Field value, treating an empty string as absent.
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.fields
    }

    /// The integer score, or [`SCORE_UNAVAILABLE`].
    pub fn score(&self) -> i64 {
        parse_score(self)
    }
}

/// Extract every recognized field from `text`.
pub fn extract_markup(text: &str) -> Markup {
    let mut text = text.to_string();
    for field in TERMINAL_FIELDS {
        let open = format!("<{field}>");
        let close = format!("</{field}>");
        if text.contains(&open) && !text.contains(&close) {
            text.push_str(&close);
        }
    }

    let mut fields = BTreeMap::new();
    for (field, pattern) in FIELD_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(&text) {
            fields.insert((*field).to_string(), captures[1].trim().to_string());
        }
    }

    if let Some(code) = fields.get_mut("code") {
        if let Some(block) = first_code_block(code) {
            *code = block;
        }
    }

    Markup { fields }
}

/// Content of the first fenced block in `text`, if any.
pub fn first_code_block(text: &str) -> Option<String> {
    CODE_FENCE
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
}

/// Integer value of the score field, or [`SCORE_UNAVAILABLE`].
pub fn parse_score(markup: &Markup) -> i64 {
    markup
        .get("score")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(SCORE_UNAVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_and_code() {
        let markup = extract_markup("<plan>X</plan><code>print(1)</code>");
        assert_eq!(markup.len(), 2);
        assert_eq!(markup.get("plan"), Some("X"));
        assert_eq!(markup.get("code"), Some("print(1)"));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let markup = extract_markup("no tags here");
        assert!(markup.is_empty());
        assert!(markup.get("plan").is_none());
    }

    #[test]
    fn test_fields_are_trimmed_and_span_lines() {
        let markup = extract_markup("<plan>\n  step one\n  step two\n</plan>");
        assert_eq!(markup.get("plan"), Some("step one\n  step two"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let markup = extract_markup("<plan>a</plan><plan>b</plan>");
        assert_eq!(markup.get("plan"), Some("a"));
    }

    #[test]
    fn test_truncated_score_is_closed() {
        let markup = extract_markup("<feedback>close</feedback><score> 7");
        assert_eq!(markup.get("score"), Some("7"));
        assert_eq!(markup.score(), 7);
    }

    #[test]
    fn test_truncated_final_answer_is_closed() {
        let markup = extract_markup("<final_answer>42");
        assert_eq!(markup.get("final_answer"), Some("42"));
    }

    #[test]
    fn test_truncated_plan_is_not_closed() {
        let markup = extract_markup("<plan>unfinished");
        assert!(markup.get("plan").is_none());
    }

    #[test]
    fn test_code_fence_keeps_first_block() {
        let text = "<code>Here is the code:\n```python\nprint(1)\n```\nand another\n```python\nprint(2)\n```</code>";
        let markup = extract_markup(text);
        assert_eq!(markup.get("code"), Some("print(1)"));
    }

    #[test]
    fn test_code_fence_case_insensitive_tag() {
        let markup = extract_markup("<code>```Python\nx = 1\nprint(x)\n```</code>");
        assert_eq!(markup.get("code"), Some("x = 1\nprint(x)"));
    }

    #[test]
    fn test_single_line_fence_drops_python_tag() {
        let markup = extract_markup("<code>```python print(1)```</code>");
        assert_eq!(markup.get("code"), Some("print(1)"));
        assert_eq!(first_code_block("```py x = 2```").as_deref(), Some("x = 2"));
    }

    #[test]
    fn test_single_line_bare_fence() {
        assert_eq!(first_code_block("```print(1)```").as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_bare_code_fence() {
        let markup = extract_markup("<code>```\nprint('hi')\n```</code>");
        assert_eq!(markup.get("code"), Some("print('hi')"));
    }

    #[test]
    fn test_unfenced_code_untouched() {
        let markup = extract_markup("<code>\nimport math\nprint(math.pi)\n</code>");
        assert_eq!(markup.get("code"), Some("import math\nprint(math.pi)"));
    }

    #[test]
    fn test_score_unavailable() {
        assert_eq!(extract_markup("<score>high</score>").score(), SCORE_UNAVAILABLE);
        assert_eq!(extract_markup("<feedback>x</feedback>").score(), SCORE_UNAVAILABLE);
        assert_eq!(extract_markup("<score>-3</score>").score(), -3);
    }

    #[test]
    fn test_sage_verdict_fields() {
        let text = "<solved>False</solved>\n<critical_feedback>off by one</critical_feedback>\n<reasoning_steps>recount</reasoning_steps>\n<code>print(5)</code>";
        let markup = extract_markup(text);
        assert_eq!(markup.get("solved"), Some("False"));
        assert_eq!(markup.get("critical_feedback"), Some("off by one"));
        assert_eq!(markup.get("reasoning_steps"), Some("recount"));
        assert_eq!(markup.get("code"), Some("print(5)"));
    }
}
