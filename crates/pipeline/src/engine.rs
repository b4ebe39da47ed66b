//! End-to-end query processing over one uploaded policy.

use std::sync::Arc;

use clausemind_common::error::{ClauseError, ClauseResult};
use tracing::{debug, info};

use crate::alternate::PlanCorpus;
use crate::annotate::build_clause;
use crate::cache::SegmentCache;
use crate::config::PipelineConfig;
use crate::deadline::Deadline;
use crate::decision::derive;
use crate::document::{extract_pages, Document};
use crate::model::QueryResult;
use crate::query::StructuredQuery;
use crate::retrieval::retrieve;
use crate::segment::{segment_pages, Segment};

/// Cheap to clone; every clone shares the plan corpus and segment cache.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    corpus: Arc<PlanCorpus>,
    cache: Option<Arc<SegmentCache>>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, corpus: Arc<PlanCorpus>) -> Self {
        Self {
            config: Arc::new(config),
            corpus,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SegmentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn corpus(&self) -> &PlanCorpus {
        &self.corpus
    }

    /// Extract and segment a document, consulting the cache first.
    pub fn segment(
        &self,
        document: &Document<'_>,
        deadline: &Deadline,
    ) -> ClauseResult<Arc<Vec<Segment>>> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(document.bytes)) {
            debug!(source = document.source, segments = hit.len(), "segment cache hit");
            return Ok(hit);
        }

        let pages = extract_pages(document.bytes, deadline)?;
        let segments = segment_pages(&pages, &self.config.segmentation, deadline)?;
        debug!(
            source = document.source,
            pages = pages.len(),
            segments = segments.len(),
            "document segmented"
        );

        Ok(match &self.cache {
            Some(cache) => cache.insert(document.bytes, segments),
            None => Arc::new(segments),
        })
    }

    pub fn process_query(
        &self,
        query: &str,
        document: &Document<'_>,
        deadline: Deadline,
    ) -> ClauseResult<QueryResult> {
        if query.trim().is_empty() {
            return Err(ClauseError::EmptyQuery);
        }
        let segments = self.segment(document, &deadline)?;
        self.answer(query, document.source, &segments, &deadline)
    }

    /// Answer a query against segments that are already extracted.
    pub fn answer(
        &self,
        query: &str,
        source: &str,
        segments: &[Segment],
        deadline: &Deadline,
    ) -> ClauseResult<QueryResult> {
        if query.trim().is_empty() {
            return Err(ClauseError::EmptyQuery);
        }
        let parsed = StructuredQuery::parse(query);
        debug!(query = ?parsed, "query parsed");

        let ranked = retrieve(&parsed, segments, &self.config, deadline)?;

        if ranked.is_empty() {
            let alternate_plan = self.corpus.suggest(&parsed, &self.config, deadline)?;
            info!(
                source,
                segments = segments.len(),
                alternate = alternate_plan.as_ref().map(|a| a.name.as_str()),
                "no clause matched"
            );
            return Ok(QueryResult {
                clauses: Vec::new(),
                decision: None,
                alternate_plan,
            });
        }

        let matched: Vec<&Segment> = ranked.iter().map(|r| r.segment).collect();
        let decision = derive(&matched, &parsed);

        let clauses = ranked
            .iter()
            .map(|r| build_clause(r.segment, &r.relevance, source, &self.config))
            .collect::<Vec<_>>();

        info!(
            source,
            segments = segments.len(),
            clauses = clauses.len(),
            top = clauses.first().map(|c| c.confidence),
            eligible = decision.as_ref().map(|d| d.eligible),
            "query answered"
        );

        Ok(QueryResult {
            clauses,
            decision,
            alternate_plan: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternate::Plan;
    use crate::decision::{REASON_EXCLUDED, REASON_WAITING_PERIOD};
    use crate::document::testing::pdf_with_lines;
    use std::time::Duration;

    const ROOM_RENT: &str = "Room rent is limited to one percent of the sum insured per day.";
    const KNEE: &str =
        "Knee surgery is covered after a waiting period of 6 months from policy start.";
    const AMBULANCE: &str =
        "Ambulance charges are reimbursed up to Rs. 2,000 per hospitalisation event.";
    const DENTAL: &str =
        "Dental treatment including root canal is covered up to Rs. 15,000 per policy year.";

    fn pipeline() -> Pipeline {
        let config = PipelineConfig::default();
        let corpus = PlanCorpus::from_plans(vec![Plan::from_text("Gold Smile", DENTAL, &config)]);
        Pipeline::new(config, Arc::new(corpus))
    }

    fn policy() -> Vec<u8> {
        pdf_with_lines(&[ROOM_RENT, KNEE, AMBULANCE])
    }

    #[test]
    fn waiting_period_scenario() {
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("46M, knee surgery, Pune, 3-month policy", &doc, Deadline::none())
            .unwrap();

        assert_eq!(result.clauses.len(), 1);
        let clause = &result.clauses[0];
        assert!(clause.text.contains("<mark>Knee</mark> <mark>surgery</mark>"), "{}", clause.text);
        assert_eq!(clause.source, "policy.pdf");
        assert!((clause.confidence - 83.3).abs() < 1e-9, "confidence={}", clause.confidence);
        assert_eq!(clause.relevance_score, clause.confidence);
        assert!(clause.justification.contains("knee"));

        let decision = result.decision.unwrap();
        assert!(!decision.eligible);
        assert_eq!(decision.reason, REASON_WAITING_PERIOD);
        assert_eq!(decision.next_eligible_in_days, Some(90));
        assert_eq!(decision.amount, None);
        assert!(result.alternate_plan.is_none());
    }

    #[test]
    fn no_match_suggests_alternate_plan() {
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("Is dental treatment covered?", &doc, Deadline::none())
            .unwrap();

        assert!(result.clauses.is_empty());
        assert!(result.decision.is_none());
        let alt = result.alternate_plan.unwrap();
        assert_eq!(alt.name, "Gold Smile");
        assert_eq!(alt.clause, DENTAL);
        assert_eq!(alt.confidence, 100.0);
    }

    #[test]
    fn no_match_without_corpus_is_empty() {
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");
        let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(PlanCorpus::empty()));
        let result = pipeline
            .process_query("maternity benefit", &doc, Deadline::none())
            .unwrap();
        assert_eq!(result, QueryResult::default());
    }

    #[test]
    fn covered_with_capped_amount() {
        let bytes = pdf_with_lines(&[
            ROOM_RENT,
            "Cataract surgery is covered up to Rs. 40,000 per eye per policy year.",
        ]);
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("claim Rs. 90,000 for cataract surgery", &doc, Deadline::none())
            .unwrap();

        let decision = result.decision.unwrap();
        assert!(decision.eligible);
        assert_eq!(decision.reason, "covered under 1 matched clause(s)");
        assert_eq!(decision.amount, Some(40000.0));
        assert_eq!(decision.next_eligible_in_days, None);
    }

    #[test]
    fn exclusion_scenario() {
        let bytes = pdf_with_lines(&[
            ROOM_RENT,
            "Cosmetic surgery and its complications are excluded from this policy.",
        ]);
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("cosmetic surgery", &doc, Deadline::none())
            .unwrap();

        let decision = result.decision.unwrap();
        assert!(!decision.eligible);
        assert_eq!(decision.reason, REASON_EXCLUDED);
    }

    #[test]
    fn clauses_sorted_by_confidence() {
        let bytes = pdf_with_lines(&[
            "Any surgery requires pre-authorisation from the insurer at least two days ahead.",
            ROOM_RENT,
            KNEE,
        ]);
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("knee surgery", &doc, Deadline::none())
            .unwrap();

        assert_eq!(result.clauses.len(), 2);
        assert!(result.clauses[0].text.contains("Knee"));
        assert!(result.clauses[0].confidence > result.clauses[1].confidence);
    }

    #[test]
    fn blank_query_is_rejected_before_parsing() {
        let doc = Document::new(b"not even a pdf", "x.pdf");
        let err = pipeline()
            .process_query("   ", &doc, Deadline::none())
            .unwrap_err();
        assert!(matches!(err, ClauseError::EmptyQuery), "err={err:?}");
    }

    #[test]
    fn invalid_document() {
        let doc = Document::new(b"hello world", "notes.txt");
        let err = pipeline()
            .process_query("knee surgery", &doc, Deadline::none())
            .unwrap_err();
        assert!(matches!(err, ClauseError::InvalidDocument(_)), "err={err:?}");
    }

    #[test]
    fn expired_deadline_times_out() {
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");
        let err = pipeline()
            .process_query("knee surgery", &doc, Deadline::after(Duration::ZERO))
            .unwrap_err();
        assert!(matches!(err, ClauseError::Timeout { .. }), "err={err:?}");
    }

    #[test]
    fn cache_is_output_neutral() {
        let cache = Arc::new(SegmentCache::new(4));
        let cached = pipeline().with_cache(Arc::clone(&cache));
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");

        let first = cached
            .process_query("knee surgery", &doc, Deadline::none())
            .unwrap();
        let second = cached
            .process_query("knee surgery", &doc, Deadline::none())
            .unwrap();
        let uncached = pipeline()
            .process_query("knee surgery", &doc, Deadline::none())
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(first, second);
        assert_eq!(first, uncached);
    }

    #[test]
    fn serialized_result_omits_absent_fields() {
        let bytes = policy();
        let doc = Document::new(&bytes, "policy.pdf");
        let result = pipeline()
            .process_query("46M, knee surgery, Pune, 3-month policy", &doc, Deadline::none())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["decision"]["next_eligible_in_days"], 90);
        assert!(json["decision"].get("amount").is_none());
        assert!(json.get("alternate_plan").is_none());
        assert!(json["clauses"][0].get("summary").is_none());
    }
}
