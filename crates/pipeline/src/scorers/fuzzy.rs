use crate::query::StructuredQuery;
use crate::text::ClauseTerms;
use crate::trace::ScorerResult;

use super::Scorer;

/// Mean best Jaro-Winkler similarity of each query term to any clause word.
/// Similarities under `min_similarity` count as zero.
pub struct FuzzyTermScorer {
    pub weight: f64,
    pub min_similarity: f64,
}

impl FuzzyTermScorer {
    fn best_similarity(&self, term: &str, clause: &ClauseTerms) -> f64 {
        if clause.contains(term) {
            return 1.0;
        }
        let best = clause
            .iter()
            .map(|w| strsim::jaro_winkler(term, w))
            .fold(0.0_f64, f64::max);
        if best >= self.min_similarity {
            best
        } else {
            0.0
        }
    }
}

impl Scorer for FuzzyTermScorer {
    fn name(&self) -> &'static str {
        "fuzzy_term"
    }

    fn score(&self, query: &StructuredQuery, clause: &ClauseTerms) -> ScorerResult {
        let (score, weight) = if query.terms.is_empty() || clause.is_empty() {
            (0.0, if query.terms.is_empty() { 0.0 } else { self.weight })
        } else {
            let total: f64 = query
                .terms
                .iter()
                .map(|t| self.best_similarity(t, clause))
                .sum();
            (total / query.terms.len() as f64, self.weight)
        };

        ScorerResult {
            rule: self.name().to_string(),
            score,
            weight,
            weighted_score: score * weight,
            detail: format!("min_similarity={}", self.min_similarity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FuzzyTermScorer {
        FuzzyTermScorer {
            weight: 0.2,
            min_similarity: 0.85,
        }
    }

    #[test]
    fn spelling_variants_score_high() {
        let q = StructuredQuery::parse("hospitalization");
        let r = scorer().score(&q, &ClauseTerms::new("Hospitalisation is covered."));
        assert!(r.score > 0.9, "score={}", r.score);
    }

    #[test]
    fn dissimilar_words_score_zero() {
        let q = StructuredQuery::parse("cataract");
        let r = scorer().score(&q, &ClauseTerms::new("Dental implants are excluded."));
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn exact_term_scores_one() {
        let q = StructuredQuery::parse("knee");
        let r = scorer().score(&q, &ClauseTerms::new("knee"));
        assert!((r.score - 1.0).abs() < f64::EPSILON);
    }
}
