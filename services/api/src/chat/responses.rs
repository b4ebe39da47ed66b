use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}
