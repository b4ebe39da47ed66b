use axum::extract::{Multipart, State};
use axum::Json;
use clausemind_common::error::ClauseError;

use crate::error::ApiError;
use crate::extractors::FormFields;
use crate::AppState;

use super::responses::TranscriptResponse;

pub async fn post_whisper(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Some(transcriber) = state.transcriber.clone() else {
        return Err(ApiError(ClauseError::TranscriptionUnavailable(
            "transcription is not configured".to_string(),
        )));
    };

    let mut form = FormFields::read(multipart).await?;
    let audio = form.take_file("file")?;
    if audio.bytes.is_empty() {
        return Err(ApiError(ClauseError::Validation(
            "audio file is empty".to_string(),
        )));
    }

    let text = transcriber
        .transcribe(audio.bytes, &audio.file_name)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "transcription failed");
            ClauseError::TranscriptionUnavailable(e.to_string())
        })?;

    state.stats.record_transcription();
    let text = text.trim();
    Ok(Json(TranscriptResponse {
        transcript: (!text.is_empty()).then(|| text.to_string()),
    }))
}
