//! Turns a scored segment into the `Clause` shown to the user.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::PipelineConfig;
use crate::model::Clause;
use crate::scorers::clarity::{clarity_score, explanation_score};
use crate::scorers::Relevance;
use crate::segment::Segment;
use crate::text::normalize;

const SUMMARY_MAX_CHARS: usize = 200;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid regex"));

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap every word whose normalised form is in `terms` in `<mark>` tags.
/// The rest of the text is HTML-escaped.
pub fn highlight(text: &str, terms: &[String]) -> String {
    let mut out = String::with_capacity(text.len() + terms.len() * 13);
    let mut last = 0;
    for m in WORD_RE.find_iter(text) {
        if terms.iter().any(|t| *t == normalize(m.as_str())) {
            out.push_str(&escape_html(&text[last..m.start()]));
            out.push_str("<mark>");
            out.push_str(&escape_html(m.as_str()));
            out.push_str("</mark>");
            last = m.end();
        }
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

pub fn justification(relevance: &Relevance) -> String {
    let other_terms: Vec<&str> = relevance
        .matched_terms
        .iter()
        .filter(|t| !relevance.matched_keywords.contains(t))
        .map(String::as_str)
        .collect();

    match (relevance.matched_keywords.is_empty(), other_terms.is_empty()) {
        (false, true) => format!(
            "Contains keyword(s): {}",
            relevance.matched_keywords.join(", ")
        ),
        (false, false) => format!(
            "Contains keyword(s): {}; also mentions: {}",
            relevance.matched_keywords.join(", "),
            other_terms.join(", ")
        ),
        (true, _) => format!("Mentions query term(s): {}", other_terms.join(", ")),
    }
}

/// First sentence of a long clause, trimmed to a readable length.
pub fn summarize(text: &str, min_words: usize) -> Option<String> {
    if text.split_whitespace().count() < min_words {
        return None;
    }
    let first = text
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(text)
        .trim();
    if first.chars().count() <= SUMMARY_MAX_CHARS {
        return Some(first.to_string());
    }
    let cut: String = first.chars().take(SUMMARY_MAX_CHARS).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) => &cut[..pos],
        None => cut.as_str(),
    };
    Some(format!("{}…", cut.trim_end_matches([',', ';', ':'])))
}

pub fn build_clause(
    segment: &Segment,
    relevance: &Relevance,
    source: &str,
    config: &PipelineConfig,
) -> Clause {
    let clarity = clarity_score(&segment.text);
    Clause {
        text: highlight(&segment.text, &relevance.matched_terms),
        justification: justification(relevance),
        source: source.to_string(),
        summary: summarize(&segment.text, config.summary_min_words),
        confidence: relevance.score,
        relevance_score: relevance.score,
        clarity_score: clarity,
        explanation_score: explanation_score(relevance.score, clarity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StructuredQuery;
    use crate::scorers::evaluate;
    use crate::text::ClauseTerms;

    #[test]
    fn highlight_marks_whole_words_case_insensitively() {
        let terms = vec!["knee".to_string(), "surgery".to_string()];
        assert_eq!(
            highlight("Knee surgeries & kneecap care", &terms),
            "<mark>Knee</mark> <mark>surgeries</mark> &amp; kneecap care"
        );
    }

    #[test]
    fn highlight_without_terms_only_escapes() {
        assert_eq!(highlight("a < b", &[]), "a &lt; b");
    }

    #[test]
    fn justification_lists_keywords_and_terms() {
        let query = StructuredQuery::parse("knee surgery in Pune");
        let r = evaluate(
            &PipelineConfig::default(),
            &query,
            &ClauseTerms::new("Knee surgery at Pune network hospitals is cashless."),
        );
        assert_eq!(
            justification(&r),
            "Contains keyword(s): knee, surgery; also mentions: pune"
        );
    }

    #[test]
    fn summary_only_for_long_clauses() {
        assert_eq!(summarize("Too short to summarise.", 30), None);
        let long = format!(
            "Knee surgery is covered in full. {}",
            vec!["detail"; 40].join(" ")
        );
        assert_eq!(
            summarize(&long, 30).as_deref(),
            Some("Knee surgery is covered in full.")
        );
    }

    #[test]
    fn long_first_sentence_is_truncated() {
        let long = vec!["coverage"; 60].join(" ");
        let summary = summarize(&long, 30).unwrap();
        assert!(summary.ends_with('…'));
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS + 1);
    }
}
