use crate::query::StructuredQuery;
use crate::text::ClauseTerms;
use crate::trace::ScorerResult;

use super::Scorer;

/// Fraction of all query content terms present in the clause.
pub struct TermOverlapScorer {
    pub weight: f64,
}

impl Scorer for TermOverlapScorer {
    fn name(&self) -> &'static str {
        "term_overlap"
    }

    fn score(&self, query: &StructuredQuery, clause: &ClauseTerms) -> ScorerResult {
        let (score, weight) = if query.terms.is_empty() {
            (0.0, 0.0)
        } else {
            let hits = query.terms.iter().filter(|t| clause.contains(t)).count();
            (hits as f64 / query.terms.len() as f64, self.weight)
        };

        ScorerResult {
            rule: self.name().to_string(),
            score,
            weight,
            weighted_score: score * weight,
            detail: format!("terms={:?}", query.terms),
        }
    }
}
