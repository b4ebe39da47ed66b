//! Tokenisation helpers shared by query parsing, scoring and highlighting.

use std::collections::HashSet;

/// Words that carry no retrieval signal in policy questions.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "benefit", "benefits", "but", "by", "can", "claim", "claims",
    "cover", "coverage", "covered", "covers", "did", "do", "does", "during", "eligible", "for",
    "from", "get", "got", "had", "has", "have", "he", "her", "his", "how", "i", "if", "in",
    "insurance", "insured", "into", "is", "it", "its", "me", "my", "need", "not", "of", "old",
    "on", "or", "our", "per", "plan", "please", "policy", "she", "should", "so", "than", "that",
    "the", "their", "them", "there", "this", "to", "under", "was", "we", "were", "what", "when",
    "which", "who", "will", "with", "would", "you", "your",
];

/// Time units; they describe the query context, not the clause topic.
const DURATION_WORDS: &[&str] = &[
    "day", "days", "week", "weeks", "month", "months", "year", "years", "yr", "yrs",
];

const GENDER_WORDS: &[&str] = &["male", "female", "man", "woman", "men", "women"];

/// Split text into lowercase alphanumeric words.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Reduce simple English plurals so "surgeries" matches "surgery".
pub fn normalize(word: &str) -> String {
    let w = word.to_lowercase();
    if w.len() > 4 && w.ends_with("ies") {
        format!("{}y", &w[..w.len() - 3])
    } else if w.len() > 3
        && w.ends_with('s')
        && !["ss", "us", "is", "etes"].iter().any(|suffix| w.ends_with(suffix))
    {
        w[..w.len() - 1].to_string()
    } else {
        w
    }
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// True for words worth matching against clause text.
pub fn is_content_word(word: &str) -> bool {
    word.chars().count() >= 3
        && !word.chars().any(|c| c.is_ascii_digit())
        && !is_stopword(word)
        && !DURATION_WORDS.contains(&word)
        && !GENDER_WORDS.contains(&word)
}

/// Normalised word set of a clause, built once per segment.
#[derive(Debug, Clone)]
pub struct ClauseTerms {
    set: HashSet<String>,
    /// Distinct normalised words in first-seen order (stable fuzzy scans).
    ordered: Vec<String>,
}

impl ClauseTerms {
    pub fn new(text: &str) -> Self {
        let mut set = HashSet::new();
        let mut ordered = Vec::new();
        for w in words(text) {
            let n = normalize(&w);
            if set.insert(n.clone()) {
                ordered.push(n);
            }
        }
        Self { set, ordered }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.set.contains(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Round to one decimal place, the precision exposed on the wire.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Split text into sentences on `.`, `!` and `?`, dropping empty pieces.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
