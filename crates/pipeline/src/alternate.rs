//! Alternate-plan suggestions drawn from a corpus of other policies.

use std::fs;
use std::path::{Path, PathBuf};

use clausemind_common::error::ClauseResult;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::deadline::Deadline;
use crate::document::extract_pages;
use crate::model::AlternatePlan;
use crate::query::StructuredQuery;
use crate::retrieval::retrieve;
use crate::segment::{segment_pages, segment_text, Segment};

/// A named, pre-segmented policy.
#[derive(Debug, Clone)]
pub struct Plan {
    pub name: String,
    pub segments: Vec<Segment>,
}

impl Plan {
    pub fn from_text(name: impl Into<String>, text: &str, config: &PipelineConfig) -> Self {
        Self {
            name: name.into(),
            segments: segment_text(text, &config.segmentation),
        }
    }

    pub fn from_pdf(
        name: impl Into<String>,
        bytes: &[u8],
        config: &PipelineConfig,
    ) -> ClauseResult<Self> {
        let deadline = Deadline::none();
        let pages = extract_pages(bytes, &deadline)?;
        let segments = segment_pages(&pages, &config.segmentation, &deadline)?;
        Ok(Self {
            name: name.into(),
            segments,
        })
    }
}

/// Immutable set of plans, loaded once and shared between requests.
#[derive(Debug, Clone, Default)]
pub struct PlanCorpus {
    plans: Vec<Plan>,
}

impl PlanCorpus {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_plans(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// Load every `.pdf` in `dir`, sorted by file name. Files that cannot be
    /// read or parsed are skipped. A missing directory yields an empty corpus.
    pub fn load_dir(dir: &Path, config: &PipelineConfig) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "plan directory unavailable, no alternate plans");
                return Self::empty();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        paths.sort();

        let mut plans = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let loaded = fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| Plan::from_pdf(name, &bytes, config).map_err(|e| e.to_string()));
            match loaded {
                Ok(plan) => plans.push(plan),
                Err(error) => warn!(path = %path.display(), %error, "skipping plan"),
            }
        }

        info!(dir = %dir.display(), plans = plans.len(), "plan corpus loaded");
        Self { plans }
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Best-scoring clause across all plans, if it clears the relevance
    /// threshold. The earliest plan wins a tie.
    pub fn suggest(
        &self,
        query: &StructuredQuery,
        config: &PipelineConfig,
        deadline: &Deadline,
    ) -> ClauseResult<Option<AlternatePlan>> {
        let mut best: Option<AlternatePlan> = None;

        for plan in &self.plans {
            deadline.check("alternate_plan")?;
            let Some(top) = retrieve(query, &plan.segments, config, deadline)?.into_iter().next()
            else {
                continue;
            };
            let beats = best
                .as_ref()
                .map_or(true, |b| top.relevance.score > b.confidence);
            if beats {
                best = Some(AlternatePlan {
                    name: plan.name.clone(),
                    clause: top.segment.text.clone(),
                    confidence: top.relevance.score,
                });
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testing::pdf_with_lines;

    const DENTAL: &str = "Dental treatment including root canal is covered up to Rs. 15,000 per policy year.";

    fn corpus() -> PlanCorpus {
        let cfg = PipelineConfig::default();
        PlanCorpus::from_plans(vec![
            Plan::from_text(
                "Silver Health",
                "Ambulance charges are reimbursed up to Rs. 2,000 per hospitalisation event.",
                &cfg,
            ),
            Plan::from_text("Gold Smile", DENTAL, &cfg),
            Plan::from_text(
                "Platinum Care",
                "Dental treatment and dental surgery are covered without any sub-limit.",
                &cfg,
            ),
        ])
    }

    #[test]
    fn suggests_best_clause_across_plans() {
        let q = StructuredQuery::parse("Is dental treatment covered?");
        let alt = corpus()
            .suggest(&q, &PipelineConfig::default(), &Deadline::none())
            .unwrap()
            .unwrap();
        assert_eq!(alt.name, "Gold Smile");
        assert_eq!(alt.clause, DENTAL);
        assert_eq!(alt.confidence, 100.0);
    }

    #[test]
    fn nothing_relevant_anywhere() {
        let q = StructuredQuery::parse("maternity benefit");
        let alt = corpus()
            .suggest(&q, &PipelineConfig::default(), &Deadline::none())
            .unwrap();
        assert!(alt.is_none());
    }

    #[test]
    fn empty_corpus_suggests_nothing() {
        let q = StructuredQuery::parse("dental");
        let alt = PlanCorpus::empty()
            .suggest(&q, &PipelineConfig::default(), &Deadline::none())
            .unwrap();
        assert!(alt.is_none());
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = std::env::temp_dir().join("clausemind-no-such-plan-dir");
        let corpus = PlanCorpus::load_dir(&dir, &PipelineConfig::default());
        assert!(corpus.is_empty());
    }

    #[test]
    fn loads_sorted_pdfs_and_skips_broken_files() {
        let dir = std::env::temp_dir().join(format!("clausemind-plans-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b_dental.pdf"), pdf_with_lines(&[DENTAL])).unwrap();
        fs::write(
            dir.join("a_ambulance.pdf"),
            pdf_with_lines(&["Ambulance charges are reimbursed up to Rs. 2,000 per event."]),
        )
        .unwrap();
        fs::write(dir.join("c_broken.pdf"), b"not a pdf").unwrap();
        fs::write(dir.join("notes.txt"), DENTAL).unwrap();

        let corpus = PlanCorpus::load_dir(&dir, &PipelineConfig::default());
        fs::remove_dir_all(&dir).unwrap();

        let names: Vec<&str> = corpus.plans().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a_ambulance.pdf", "b_dental.pdf"]);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.plans()[1].segments.len(), 1);
    }
}
