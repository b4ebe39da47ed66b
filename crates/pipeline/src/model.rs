use serde::{Deserialize, Serialize};

/// One span of policy text judged relevant to a query.
///
/// `confidence` mirrors `relevance_score` and is the only field that drives
/// ordering. `clarity_score` and `explanation_score` are display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Clause text with matched query terms wrapped in `<mark>` tags.
    pub text: String,
    pub justification: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub confidence: f64,
    pub relevance_score: f64,
    pub clarity_score: f64,
    pub explanation_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub eligible: bool,
    pub reason: String,
    /// Set only when `eligible` is false because a waiting period is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_eligible_in_days: Option<u32>,
    /// Set only when `eligible` is true and the matched clause states a cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternatePlan {
    pub name: String,
    pub clause: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub clauses: Vec<Clause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_plan: Option<AlternatePlan>,
}
