use axum::extract::State;
use axum::Json;
use clausemind_common::error::ClauseError;

use crate::error::ApiError;
use crate::AppState;

use super::requests::ChatRequest;
use super::responses::ChatResponse;

pub async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(advisor) = state.advisor.clone() else {
        return Err(ApiError(ClauseError::ChatUnavailable(
            "chat advisor is not configured".to_string(),
        )));
    };
    body.validate()?;

    let reply = advisor.complete(&body.messages).await.map_err(|e| {
        tracing::warn!(error = %e, "chat completion failed");
        ClauseError::ChatUnavailable(e.to_string())
    })?;

    state.stats.record_chat();
    tracing::info!(turns = body.messages.len(), "chat reply served");
    Ok(Json(ChatResponse {
        reply: reply.trim().to_string(),
    }))
}
