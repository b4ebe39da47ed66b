//! Structured attributes pulled out of a free-text policy question.
//!
//! "46M, knee surgery, Pune, 3-month policy" yields age 46, gender male,
//! procedure keywords `knee` and `surgery`, location Pune and a policy
//! duration of 90 days.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{is_content_word, normalize, words};

/// Procedure and condition vocabulary recognised as query keywords.
/// Extend this list to cover additional procedures.
pub const PROCEDURE_KEYWORDS: &[&str] = &[
    "accident",
    "ambulance",
    "angioplasty",
    "appendix",
    "bypass",
    "cancer",
    "cataract",
    "chemotherapy",
    "daycare",
    "dental",
    "diabetes",
    "dialysis",
    "fracture",
    "heart",
    "hernia",
    "hospitalisation",
    "hospitalization",
    "icu",
    "knee",
    "maternity",
    "physiotherapy",
    "procedure",
    "surgery",
    "transplant",
    "treatment",
    "tumor",
    "tumour",
];

static AGE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})\s?([mf])\b").expect("valid regex"));
static AGE_YEARS_OLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,3})[\s-]?(?:years?|yrs?)[\s-]?old\b").expect("valid regex")
});
static GENDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(male|female|man|woman)\b").expect("valid regex"));
static DURATION_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d+)[\s-]?(days?|weeks?|months?|years?|yrs?)[\s-]?(?:old[\s-]+)?(?:policy|plan|cover)\b",
    )
    .expect("valid regex")
});
static DURATION_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:policy|plan|cover)\s+(?:is\s+|of\s+|for\s+|since\s+|duration\s+|age\s+)*(\d+)[\s-]?(days?|weeks?|months?|years?|yrs?)\b",
    )
    .expect("valid regex")
});
static LOCATION_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bin\s+([A-Z][a-zA-Z]+)").expect("valid regex"));
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₹|\brs\.?|\binr)\s?(\d[\d,]*(?:\.\d+)?)").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub raw: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    /// Days since the policy started, when the query states it.
    pub policy_duration_days: Option<u32>,
    /// Amount the claimant asks for, when stated.
    pub requested_amount: Option<f64>,
    /// Normalised procedure keywords, in query order.
    pub keywords: Vec<String>,
    /// Normalised content terms (keywords included), in query order.
    pub terms: Vec<String>,
}

impl StructuredQuery {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();

        let mut terms: Vec<String> = Vec::new();
        for w in words(raw) {
            let n = normalize(&w);
            if !is_content_word(&n) {
                continue;
            }
            if !terms.contains(&n) {
                terms.push(n);
            }
        }

        let keywords = terms
            .iter()
            .filter(|t| PROCEDURE_KEYWORDS.iter().any(|k| normalize(k) == **t))
            .cloned()
            .collect();

        let (age, suffix_gender) = parse_age(&lower);
        let gender = GENDER_RE
            .captures(&lower)
            .map(|c| match &c[1] {
                "female" | "woman" => Gender::Female,
                _ => Gender::Male,
            })
            .or(suffix_gender);

        Self {
            raw: raw.to_string(),
            age,
            gender,
            location: parse_location(raw),
            policy_duration_days: parse_policy_duration(&lower),
            requested_amount: parse_amount(raw),
            keywords,
            terms,
        }
    }

    /// True when the query has nothing to match clause text against.
    pub fn is_unmatchable(&self) -> bool {
        self.terms.is_empty()
    }
}

fn parse_age(lower: &str) -> (Option<u32>, Option<Gender>) {
    if let Some(c) = AGE_SUFFIX_RE.captures(lower) {
        let gender = if &c[2] == "f" {
            Gender::Female
        } else {
            Gender::Male
        };
        return (c[1].parse().ok(), Some(gender));
    }
    let age = AGE_YEARS_OLD_RE
        .captures(lower)
        .and_then(|c| c[1].parse().ok());
    (age, None)
}

/// Days represented by `value` of `unit` (months count as 30 days).
pub fn unit_to_days(value: u32, unit: &str) -> u32 {
    let per = if unit.starts_with("day") {
        1
    } else if unit.starts_with("week") {
        7
    } else if unit.starts_with("month") {
        30
    } else {
        365
    };
    value.saturating_mul(per)
}

fn parse_policy_duration(lower: &str) -> Option<u32> {
    DURATION_BEFORE_RE
        .captures(lower)
        .or_else(|| DURATION_AFTER_RE.captures(lower))
        .and_then(|c| {
            let value: u32 = c[1].parse().ok()?;
            Some(unit_to_days(value, &c[2]))
        })
}

fn parse_location(raw: &str) -> Option<String> {
    if let Some(c) = LOCATION_IN_RE.captures(raw) {
        return Some(c[1].to_string());
    }

    // Comma-separated shorthand: a lone capitalised word such as "Pune".
    raw.split(',').map(str::trim).find_map(|fragment| {
        let mut chars = fragment.chars();
        let first = chars.next()?;
        let is_word = first.is_uppercase() && chars.all(char::is_alphabetic);
        let lower = fragment.to_lowercase();
        let is_keyword = PROCEDURE_KEYWORDS.contains(&lower.as_str());
        let is_gender = GENDER_RE.is_match(&lower);
        (is_word && fragment.len() > 2 && !is_keyword && !is_gender)
            .then(|| fragment.to_string())
    })
}

/// Parse the first currency amount in `text` (`₹50,000`, `Rs. 1,00,000`).
pub fn parse_amount(text: &str) -> Option<f64> {
    AMOUNT_RE
        .captures(text)
        .and_then(|c| c[1].replace(',', "").parse().ok())
}
