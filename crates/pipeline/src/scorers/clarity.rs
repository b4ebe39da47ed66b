//! Display-only scores. Nothing here feeds ranking or decisions.

use crate::text::{round1, sentences};

/// Shorter sentences read more clearly: `100 - min(50, mean words) * 2`.
pub fn clarity_score(text: &str) -> f64 {
    let lengths: Vec<usize> = sentences(text)
        .iter()
        .map(|s| s.split_whitespace().count())
        .filter(|&n| n > 0)
        .collect();
    if lengths.is_empty() {
        return 50.0;
    }
    let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    round1((100.0 - mean.min(50.0) * 2.0).clamp(0.0, 100.0))
}

pub fn explanation_score(confidence: f64, clarity: f64) -> f64 {
    round1(((confidence + clarity) / 2.0).clamp(0.0, 100.0))
}
