use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerResult {
    pub rule: String,
    pub score: f64,
    /// Zero when the rule does not apply to the query (e.g. no keywords).
    pub weight: f64,
    pub weighted_score: f64,
    pub detail: String,
}

/// How a clause's relevance was assembled, logged at `debug` per clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTrace {
    pub scorers: Vec<ScorerResult>,
    pub raw_total: f64,
    pub weight_sum: f64,
    pub relevance: f64,
    pub band: String,
}
