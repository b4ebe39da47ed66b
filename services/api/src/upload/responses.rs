use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub num_clauses: usize,
}
