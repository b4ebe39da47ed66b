pub mod alternate;
pub mod annotate;
pub mod cache;
pub mod config;
pub mod deadline;
pub mod decision;
pub mod document;
pub mod engine;
pub mod model;
pub mod query;
pub mod retrieval;
pub mod scorers;
pub mod segment;
pub mod text;
pub mod trace;

pub use alternate::{Plan, PlanCorpus};
pub use cache::SegmentCache;
pub use config::PipelineConfig;
pub use deadline::Deadline;
pub use document::Document;
pub use engine::Pipeline;
pub use model::{AlternatePlan, Clause, Decision, QueryResult};
pub use query::StructuredQuery;
pub use trace::ScoreTrace;
