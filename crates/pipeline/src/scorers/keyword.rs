use crate::query::StructuredQuery;
use crate::text::ClauseTerms;
use crate::trace::ScorerResult;

use super::Scorer;

/// Fraction of the query's procedure keywords present in the clause.
pub struct KeywordMatchScorer {
    pub weight: f64,
}

impl Scorer for KeywordMatchScorer {
    fn name(&self) -> &'static str {
        "keyword_match"
    }

    fn score(&self, query: &StructuredQuery, clause: &ClauseTerms) -> ScorerResult {
        if query.keywords.is_empty() {
            return ScorerResult {
                rule: self.name().to_string(),
                score: 0.0,
                weight: 0.0,
                weighted_score: 0.0,
                detail: "no procedure keywords in query".to_string(),
            };
        }

        let hits: Vec<&str> = query
            .keywords
            .iter()
            .map(String::as_str)
            .filter(|k| clause.contains(k))
            .collect();
        let score = hits.len() as f64 / query.keywords.len() as f64;

        ScorerResult {
            rule: self.name().to_string(),
            score,
            weight: self.weight,
            weighted_score: score * self.weight,
            detail: format!("keywords={:?} hits={:?}", query.keywords, hits),
        }
    }
}
