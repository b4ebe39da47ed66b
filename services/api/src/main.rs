mod chat;
mod error;
mod extractors;
mod metrics;
mod query;
mod transcribe;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clausemind_common::error::{ClauseError, ClauseResult};
use clausemind_common::types::ServiceInfo;
use clausemind_config::{init_tracing, AppConfig};
use clausemind_pipeline::{Deadline, Pipeline, PipelineConfig, PlanCorpus, SegmentCache};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::chat::{ChatClient, ChatClientConfig, ChatCompleter};
use crate::error::ApiError;
use crate::metrics::RequestStats;
use crate::transcribe::{Transcriber, WhisperClient, WhisperClientConfig};

const SERVICE_NAME: &str = "clausemind-api";

/// Slack between the pipeline deadline and the hard cut-off on the
/// blocking task, so the pipeline can report which stage overran.
const DEADLINE_GRACE: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub advisor: Option<Arc<dyn ChatCompleter>>,
    pub info: ServiceInfo,
    pub stats: Arc<RequestStats>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Run CPU-bound pipeline work off the async runtime under the
    /// request deadline.
    pub async fn run_blocking<T, F>(&self, job: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Pipeline, Deadline) -> ClauseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pipeline = self.pipeline.clone();
        let deadline = Deadline::after(self.request_timeout);
        let task = tokio::task::spawn_blocking(move || job(&pipeline, deadline));

        match tokio::time::timeout(self.request_timeout + DEADLINE_GRACE, task).await {
            Ok(Ok(result)) => result.map_err(ApiError::from),
            Ok(Err(e)) => Err(ClauseError::Internal(format!("pipeline task failed: {e}")).into()),
            Err(_) => Err(ClauseError::Timeout { stage: "request" }.into()),
        }
    }
}

/// Router-level HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "ClauseMind API is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.info)
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.stats.render(
        &state.info.name,
        &state.info.version,
        state.pipeline.corpus().len(),
    );

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn build_router(state: AppState, settings: &HttpSettings) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .merge(query::router())
        .merge(upload::router())
        .merge(transcribe::router())
        .merge(chat::router())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_upload_bytes))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}

fn pipeline_config(config: &AppConfig) -> PipelineConfig {
    let mut pipeline = PipelineConfig {
        max_clauses: config.max_clauses,
        ..PipelineConfig::default()
    };
    pipeline.thresholds.relevance = config.relevance_threshold;
    pipeline
}

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("failed to load config");
    init_tracing(&config.log_level);
    tracing::info!(service = SERVICE_NAME, "starting");

    let pipeline_config = pipeline_config(&config);
    let corpus = PlanCorpus::load_dir(&config.fallback_policies_dir, &pipeline_config);
    let pipeline = Pipeline::new(pipeline_config, Arc::new(corpus)).with_cache(Arc::new(
        SegmentCache::new(config.segment_cache_capacity),
    ));

    let mut info = ServiceInfo::new(SERVICE_NAME);
    let transcriber: Option<Arc<dyn Transcriber>> = match &config.transcription {
        Some(settings) => {
            let client = WhisperClient::new(WhisperClientConfig::from(settings))
                .expect("failed to build transcription client");
            info = info.with_feature("transcription");
            tracing::info!(base_url = %settings.base_url, "transcription enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("transcription disabled, TRANSCRIPTION_BASE_URL not set");
            None
        }
    };
    let advisor: Option<Arc<dyn ChatCompleter>> = match &config.chat {
        Some(settings) => {
            let client = ChatClient::new(ChatClientConfig::from(settings))
                .expect("failed to build chat client");
            info = info.with_feature("chat");
            tracing::info!(base_url = %settings.base_url, model = %settings.model, "chat advisor enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("chat advisor disabled, CHAT_BASE_URL not set");
            None
        }
    };
    if !pipeline.corpus().is_empty() {
        info = info.with_feature("alternate_plans");
    }

    let state = AppState {
        pipeline,
        transcriber,
        advisor,
        info,
        stats: Arc::new(RequestStats::default()),
        request_timeout: Duration::from_millis(config.request_timeout_ms),
    };
    let settings = HttpSettings {
        cors_origins: config.cors_origins.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = build_router(state, &settings);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
