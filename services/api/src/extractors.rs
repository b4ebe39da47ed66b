//! Multipart form collection shared by the upload-style endpoints.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use clausemind_common::error::ClauseError;

use crate::error::ApiError;

pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// All fields of a multipart body. Parts carrying a file name are files;
/// the rest are text. A repeated field name keeps its last value.
#[derive(Default)]
pub struct FormFields {
    texts: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    let message = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "upload exceeds the configured size limit".to_string()
    } else {
        format!("invalid multipart body: {}", err.body_text())
    };
    ApiError(ClauseError::Validation(message))
}

impl FormFields {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.files.insert(
                        name,
                        FilePart {
                            file_name,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(multipart_error)?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Result<FilePart, ApiError> {
        self.files
            .remove(name)
            .ok_or_else(|| ApiError(ClauseError::Validation(format!("missing file field `{name}`"))))
    }
}
