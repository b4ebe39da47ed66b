use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use clausemind_pipeline::{Document, QueryResult};

use crate::error::ApiError;
use crate::extractors::FormFields;
use crate::AppState;

use super::requests::QueryUpload;

pub async fn post_query(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QueryResult>, ApiError> {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::info!(code = e.0.code(), "query rejected");
            state.stats.record_query(false);
            return Err(e);
        }
    };
    tracing::info!(
        source = %upload.pdf.file_name,
        bytes = upload.pdf.bytes.len(),
        "query received"
    );

    let started = Instant::now();
    let outcome = state
        .run_blocking(move |pipeline, deadline| {
            let document = Document::new(&upload.pdf.bytes, &upload.pdf.file_name);
            pipeline.process_query(&upload.query, &document, deadline)
        })
        .await;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = outcome.is_ok(),
        "query finished"
    );
    state.stats.record_query(outcome.is_ok());
    Ok(Json(outcome?))
}

async fn read_upload(multipart: Multipart) -> Result<QueryUpload, ApiError> {
    QueryUpload::from_form(FormFields::read(multipart).await?)
}
