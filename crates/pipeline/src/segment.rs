//! Splits extracted page text into candidate clauses.
//!
//! Lines are cleaned (bullets dropped, dashes normalised, whitespace
//! collapsed) and wrapped lines are re-joined: a line is appended to the
//! previous one when that one does not end a sentence and is either shorter
//! than the minimum or followed by a lowercase continuation. Blank lines and
//! page ends close a segment. Only segments longer than `min_chars` survive.

use clausemind_common::error::ClauseResult;
use serde::{Deserialize, Serialize};

use crate::config::SegmentationConfig;
use crate::deadline::Deadline;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in document order, starting at 0.
    pub index: usize,
    pub text: String,
}

fn clean_line(line: &str) -> String {
    line.replace('•', " ")
        .replace(['–', '—'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?', ';', ':'])
}

struct Builder<'c> {
    config: &'c SegmentationConfig,
    pending: String,
    out: Vec<Segment>,
}

impl Builder<'_> {
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.pending);
        if text.chars().count() > self.config.min_chars {
            let index = self.out.len();
            self.out.push(Segment { index, text });
        }
    }

    fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            self.flush();
            return;
        }

        let continues = !self.pending.is_empty()
            && !ends_sentence(&self.pending)
            && (self.pending.chars().count() <= self.config.min_chars
                || line.starts_with(|c: char| c.is_lowercase()));

        if continues {
            self.pending.push(' ');
            self.pending.push_str(line);
        } else {
            self.flush();
            self.pending.push_str(line);
        }

        if self.pending.chars().count() >= self.config.max_chars {
            self.flush();
        }
    }
}

/// Segment page texts into clauses. Deterministic for identical input.
pub fn segment_pages<S: AsRef<str>>(
    pages: &[S],
    config: &SegmentationConfig,
    deadline: &Deadline,
) -> ClauseResult<Vec<Segment>> {
    let mut builder = Builder {
        config,
        pending: String::new(),
        out: Vec::new(),
    };

    for page in pages {
        deadline.check("segmentation")?;
        for raw in page.as_ref().lines() {
            builder.push_line(&clean_line(raw));
        }
        builder.flush();
    }

    Ok(builder.out)
}

/// Convenience for plain text treated as a single page.
pub fn segment_text(text: &str, config: &SegmentationConfig) -> Vec<Segment> {
    // An unbounded deadline cannot expire.
    segment_pages(&[text], config, &Deadline::none()).unwrap_or_default()
}
