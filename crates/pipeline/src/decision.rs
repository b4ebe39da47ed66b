//! Eligibility derivation from matched clause text.
//!
//! Rules, in priority order:
//!   1. A waiting period longer than the policy's age → not eligible,
//!      `next_eligible_in_days` = smallest remaining wait.
//!   2. An exclusion sentence in the top clause that names a query term →
//!      not eligible.
//!   3. Otherwise eligible; `amount` is the lowest coverage cap stated by
//!      any matched clause, lowered to the requested amount when the query
//!      names one.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Decision;
use crate::query::{unit_to_days, StructuredQuery};
use crate::segment::Segment;
use crate::text::{normalize, sentences, words};

pub const REASON_WAITING_PERIOD: &str = "waiting period not met";
pub const REASON_EXCLUDED: &str = "excluded by policy clause";

const NUMBER: &str = r"\b(\d+|(?:twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety)(?:[\s-](?:one|two|three|four|five|six|seven|eight|nine))?|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|one|two|three|four|five|six|seven|eight|nine|ten)\b";
/// Digits repeated in brackets after a number word, as in "two (2) years".
const BRACKETED: &str = r"(?:[\s-]*\((\d+)\))?";
const UNIT: &str = r"(days?|weeks?|months?|years?)";

static WAITING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"waiting period of {NUMBER}{BRACKETED}[\s-]*{UNIT}"),
        format!(r"{NUMBER}{BRACKETED}[\s-]*{UNIT}\s+(?:of\s+)?(?:initial\s+|continuous\s+)?waiting period"),
        format!(r"(?:after|completion of|completing)\s+(?:a\s+|an\s+)?(?:continuous\s+)?{NUMBER}{BRACKETED}\s*(?:continuous\s+)?{UNIT}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static CAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:₹|\brs\.?|\binr)\s?(\d[\d,]*(?:\.\d{1,2})?)(?:\s*(lakhs?|lacs?|crores?))?",
    )
    .expect("valid regex")
});

static EXCLUSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:excluded|exclusions?|not covered|not payable|not admissible|(?:shall|will) not be (?:covered|payable|paid|admissible|reimbursed))\b",
    )
    .expect("valid regex")
});

/// Sentences that lift a waiting period rather than deny cover.
static WAIVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:excluded|exempt(?:ed)?|waived)\s+from\s+(?:the\s+|any\s+)?(?:\w+\s+)?waiting periods?\b|\bwaiting periods?\b[^;]*\b(?:excluded|waived|not applicable|shall not apply|does not apply)\b",
    )
    .expect("valid regex")
});

const COVERAGE_PHRASES: &[&str] = &[
    "covered",
    "reimbursed",
    "maximum limit",
    "up to",
    "upto",
    "payable",
    "eligible for",
    "benefit of",
    "sum insured",
    "limited to",
    "sub-limit",
];

const UNITS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: &[&str] = &[
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn word_value(word: &str) -> Option<u32> {
    if let Some(n) = UNITS.iter().position(|u| *u == word) {
        return Some(n as u32);
    }
    TENS.iter()
        .position(|t| !t.is_empty() && *t == word)
        .map(|n| n as u32 * 10)
}

/// Value of a number written as digits or English words ("forty-eight").
fn number_value(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse() {
        return Some(n);
    }
    token
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .try_fold(0, |acc, w| word_value(w).map(|v| acc + v))
}

/// Waiting period stated by a clause, in days. Bracketed digits win over
/// the spelled-out number they repeat.
pub fn waiting_period_days(clause: &str) -> Option<u32> {
    let lower = clause.to_lowercase();
    WAITING_PATTERNS.iter().find_map(|re| {
        let c = re.captures(&lower)?;
        let value = match c.get(2) {
            Some(digits) => digits.as_str().parse().ok()?,
            None => number_value(&c[1])?,
        };
        Some(unit_to_days(value, &c[3]))
    })
}

/// Lowest payable limit stated by a clause, when it reads as a limit at all.
/// A clause may carry an overall cap and a tighter sub-limit.
pub fn coverage_cap(clause: &str) -> Option<f64> {
    let lower = clause.to_lowercase();
    if !COVERAGE_PHRASES.iter().any(|p| lower.contains(p)) {
        return None;
    }
    CAP_RE
        .captures_iter(clause)
        .filter_map(|c| {
            let base: f64 = c[1].replace(',', "").parse().ok()?;
            let multiplier = match c.get(2).map(|m| m.as_str().to_lowercase()) {
                Some(unit) if unit.starts_with("crore") => 10_000_000.0,
                Some(_) => 100_000.0,
                None => 1.0,
            };
            Some(base * multiplier)
        })
        .reduce(f64::min)
}

/// True when a sentence of `clause` both excludes and names a query term.
pub fn excludes_query(clause: &str, query: &StructuredQuery) -> bool {
    sentences(clause).into_iter().any(|sentence| {
        let lower = sentence.to_lowercase();
        EXCLUSION_RE.is_match(&lower)
            && !WAIVER_RE.is_match(&lower)
            && words(sentence).any(|w| query.terms.contains(&normalize(&w)))
    })
}

/// Derive a decision from clauses already ranked best-first.
/// Returns `None` when there is nothing to decide on.
pub fn derive(matched: &[&Segment], query: &StructuredQuery) -> Option<Decision> {
    let top = matched.first()?;
    let policy_days = query.policy_duration_days.unwrap_or(0);

    let remaining_wait = matched
        .iter()
        .filter_map(|s| waiting_period_days(&s.text))
        .filter(|&wait| wait > policy_days)
        .map(|wait| wait - policy_days)
        .min();

    if let Some(days) = remaining_wait {
        return Some(Decision {
            eligible: false,
            reason: REASON_WAITING_PERIOD.to_string(),
            next_eligible_in_days: Some(days),
            amount: None,
        });
    }

    if excludes_query(&top.text, query) {
        return Some(Decision {
            eligible: false,
            reason: REASON_EXCLUDED.to_string(),
            next_eligible_in_days: None,
            amount: None,
        });
    }

    let cap = matched
        .iter()
        .filter_map(|s| coverage_cap(&s.text))
        .reduce(f64::min);
    let amount = match (cap, query.requested_amount) {
        (Some(cap), Some(requested)) => Some(requested.min(cap)),
        (cap, _) => cap,
    };

    Some(Decision {
        eligible: true,
        reason: format!("covered under {} matched clause(s)", matched.len()),
        next_eligible_in_days: None,
        amount,
    })
}
