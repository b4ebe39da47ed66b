use serde::Serialize;

/// `{"transcript": "..."}`, or `{}` when nothing was recognised.
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}
