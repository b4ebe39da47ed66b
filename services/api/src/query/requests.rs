use crate::error::ApiError;
use crate::extractors::{FilePart, FormFields};

/// `POST /api/query` form: a `query` text field and a `pdf` file field.
pub struct QueryUpload {
    /// Empty when the field is absent; the pipeline rejects blank queries.
    pub query: String,
    pub pdf: FilePart,
}

impl QueryUpload {
    pub fn from_form(mut form: FormFields) -> Result<Self, ApiError> {
        let query = form.text("query").unwrap_or_default().to_string();
        let pdf = form.take_file("pdf")?;
        Ok(Self { query, pdf })
    }
}
