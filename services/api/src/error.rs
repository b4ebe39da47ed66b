use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clausemind_common::error::ClauseError;

pub struct ApiError(pub ClauseError);

impl From<ClauseError> for ApiError {
    fn from(err: ClauseError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClauseError::InvalidDocument(_)
            | ClauseError::EmptyQuery
            | ClauseError::Validation(_) => StatusCode::BAD_REQUEST,
            ClauseError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ClauseError::TranscriptionUnavailable(_) | ClauseError::ChatUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ClauseError::Config(_) | ClauseError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "request rejected");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });
        (status, Json(body)).into_response()
    }
}
