//! Scores every segment against a query and keeps the best matches.

use clausemind_common::error::ClauseResult;
use rayon::prelude::*;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::deadline::Deadline;
use crate::query::StructuredQuery;
use crate::scorers::{evaluate, Relevance, RelevanceBand};
use crate::segment::Segment;
use crate::text::ClauseTerms;

#[derive(Debug, Clone)]
pub struct RankedSegment<'a> {
    pub segment: &'a Segment,
    pub relevance: Relevance,
}

/// Matches at or above the relevance threshold, best first, at most
/// `config.max_clauses`. Ties keep document order.
pub fn retrieve<'a>(
    query: &StructuredQuery,
    segments: &'a [Segment],
    config: &PipelineConfig,
    deadline: &Deadline,
) -> ClauseResult<Vec<RankedSegment<'a>>> {
    if query.is_unmatchable() || segments.is_empty() {
        return Ok(Vec::new());
    }

    let scored: Vec<RankedSegment<'a>> = segments
        .par_iter()
        .map(|segment| {
            deadline.check("scoring")?;
            let terms = ClauseTerms::new(&segment.text);
            let relevance = evaluate(config, query, &terms);
            debug!(
                segment = segment.index,
                relevance = relevance.score,
                band = relevance.band.as_str(),
                trace = ?relevance.trace,
                "segment scored"
            );
            Ok(RankedSegment { segment, relevance })
        })
        .collect::<ClauseResult<Vec<_>>>()?;

    let mut matched: Vec<RankedSegment<'a>> = scored
        .into_iter()
        .filter(|r| r.relevance.band == RelevanceBand::Match)
        .collect();
    matched.sort_by(|a, b| b.relevance.score.total_cmp(&a.relevance.score));
    matched.truncate(config.max_clauses);

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausemind_common::error::ClauseError;
    use std::time::{Duration, Instant};

    fn segs(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Segment {
                index,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn ranks_best_first_and_drops_misses() {
        let segments = segs(&[
            "Room rent is limited to one percent of the sum insured per day.",
            "Surgery of any kind requires pre-authorisation from the insurer.",
            "Knee surgery and knee replacement are covered after six months.",
        ]);
        let q = StructuredQuery::parse("knee surgery");
        let out = retrieve(&q, &segments, &PipelineConfig::default(), &Deadline::none()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].segment.index, 2);
        assert_eq!(out[1].segment.index, 1);
        assert!(out[0].relevance.score > out[1].relevance.score);
    }

    #[test]
    fn ties_keep_document_order() {
        let segments = segs(&[
            "Cataract treatment is reimbursed per eye once in a policy year.",
            "Cataract treatment is payable for each eye after one year.",
        ]);
        let q = StructuredQuery::parse("cataract");
        let out = retrieve(&q, &segments, &PipelineConfig::default(), &Deadline::none()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].relevance.score, out[1].relevance.score);
        assert_eq!(out[0].segment.index, 0);
        assert_eq!(out[1].segment.index, 1);
    }

    #[test]
    fn respects_max_clauses() {
        let texts: Vec<String> = (0..15)
            .map(|i| format!("Clause {i}: hernia repair is covered under this section."))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let segments = segs(&refs);
        let q = StructuredQuery::parse("hernia");
        let out = retrieve(&q, &segments, &PipelineConfig::default(), &Deadline::none()).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].segment.index, 0);
    }

    #[test]
    fn unmatchable_query_returns_nothing() {
        let segments = segs(&["Knee surgery is covered."]);
        let q = StructuredQuery::parse("is it covered?");
        assert!(q.is_unmatchable());
        let out = retrieve(&q, &segments, &PipelineConfig::default(), &Deadline::none()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn expired_deadline_is_a_timeout() {
        let segments = segs(&["Knee surgery is covered."]);
        let q = StructuredQuery::parse("knee");
        let past = Deadline::at(Instant::now() - Duration::from_millis(1));
        let err = retrieve(&q, &segments, &PipelineConfig::default(), &past).unwrap_err();
        assert!(matches!(err, ClauseError::Timeout { stage: "scoring" }));
    }
}
