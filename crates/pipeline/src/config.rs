use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerWeights {
    pub keyword_match: f64,
    pub term_overlap: f64,
    pub fuzzy_term: f64,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.50,
            term_overlap: 0.30,
            fuzzy_term: 0.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum relevance (0–100) for a clause to be returned or suggested.
    pub relevance: f64,
    /// Minimum Jaro-Winkler similarity counted as a near match.
    pub fuzzy_similarity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            relevance: 35.0,
            fuzzy_similarity: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Segments must be longer than this many characters.
    pub min_chars: usize,
    /// Joined lines are flushed once they reach this many characters.
    pub max_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_chars: 50,
            max_chars: 1200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub weights: ScorerWeights,
    pub thresholds: Thresholds,
    pub segmentation: SegmentationConfig,
    pub max_clauses: usize,
    /// Clauses shorter than this many words get no summary.
    pub summary_min_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            weights: ScorerWeights::default(),
            thresholds: Thresholds::default(),
            segmentation: SegmentationConfig::default(),
            max_clauses: 10,
            summary_min_words: 30,
        }
    }
}
