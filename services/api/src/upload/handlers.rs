use axum::extract::{Multipart, State};
use axum::Json;
use clausemind_pipeline::Document;

use crate::error::ApiError;
use crate::extractors::FormFields;
use crate::AppState;

use super::responses::UploadResponse;

/// Segment an uploaded policy and report how many clauses it yields.
pub async fn post_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut form = FormFields::read(multipart).await?;
    let file = form.take_file("file")?;

    let num_clauses = state
        .run_blocking(move |pipeline, deadline| {
            let document = Document::new(&file.bytes, &file.file_name);
            pipeline.segment(&document, &deadline).map(|s| s.len())
        })
        .await?;

    state.stats.record_upload();
    Ok(Json(UploadResponse { num_clauses }))
}
