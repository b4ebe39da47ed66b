//! Weighted relevance scoring of one clause against one query.
//!
//! Each [`Scorer`] returns a value in [0, 1]; the relevance is the weighted
//! mean over the scorers that apply, scaled to 0–100.

pub mod clarity;
pub mod fuzzy;
pub mod keyword;
pub mod overlap;

use crate::config::PipelineConfig;
use crate::query::StructuredQuery;
use crate::text::{round1, ClauseTerms};
use crate::trace::{ScoreTrace, ScorerResult};

use self::fuzzy::FuzzyTermScorer;
use self::keyword::KeywordMatchScorer;
use self::overlap::TermOverlapScorer;

pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, query: &StructuredQuery, clause: &ClauseTerms) -> ScorerResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceBand {
    /// At or above the relevance threshold.
    Match,
    /// Some exact hit, but too weak to return.
    BelowThreshold,
    /// No query keyword or term appears verbatim in the clause.
    NoHit,
}

impl RelevanceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::BelowThreshold => "below_threshold",
            Self::NoHit => "no_hit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Relevance {
    /// 0–100, one decimal.
    pub score: f64,
    pub band: RelevanceBand,
    /// Query keywords found verbatim, in query order.
    pub matched_keywords: Vec<String>,
    /// Query terms found verbatim (keywords included), in query order.
    pub matched_terms: Vec<String>,
    pub trace: ScoreTrace,
}

fn classify(score: f64, has_hit: bool, config: &PipelineConfig) -> RelevanceBand {
    if !has_hit {
        RelevanceBand::NoHit
    } else if score >= config.thresholds.relevance {
        RelevanceBand::Match
    } else {
        RelevanceBand::BelowThreshold
    }
}

pub fn evaluate(config: &PipelineConfig, query: &StructuredQuery, clause: &ClauseTerms) -> Relevance {
    let scorers: Vec<Box<dyn Scorer>> = vec![
        Box::new(KeywordMatchScorer {
            weight: config.weights.keyword_match,
        }),
        Box::new(TermOverlapScorer {
            weight: config.weights.term_overlap,
        }),
        Box::new(FuzzyTermScorer {
            weight: config.weights.fuzzy_term,
            min_similarity: config.thresholds.fuzzy_similarity,
        }),
    ];

    let results: Vec<ScorerResult> = scorers.iter().map(|s| s.score(query, clause)).collect();

    let raw_total: f64 = results.iter().map(|r| r.weighted_score).sum();
    let weight_sum: f64 = results.iter().map(|r| r.weight).sum();

    let matched_keywords: Vec<String> = query
        .keywords
        .iter()
        .filter(|k| clause.contains(k))
        .cloned()
        .collect();
    let matched_terms: Vec<String> = query
        .terms
        .iter()
        .filter(|t| clause.contains(t))
        .cloned()
        .collect();
    let has_hit = !matched_terms.is_empty();

    let score = if has_hit && weight_sum > 0.0 {
        round1((raw_total / weight_sum).clamp(0.0, 1.0) * 100.0)
    } else {
        0.0
    };

    let band = classify(score, has_hit, config);

    let trace = ScoreTrace {
        scorers: results,
        raw_total,
        weight_sum,
        relevance: score,
        band: band.as_str().to_string(),
    };

    Relevance {
        score,
        band,
        matched_keywords,
        matched_terms,
        trace,
    }
}
