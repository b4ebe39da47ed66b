use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClauseError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("{stage} exceeded its deadline")]
    Timeout { stage: &'static str },

    #[error("transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("chat advisor unavailable: {0}")]
    ChatUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClauseError {
    /// Stable identifier for clients that pick a fallback by error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidDocument(_) => "invalid_document",
            Self::EmptyQuery => "empty_query",
            Self::Timeout { .. } => "timeout",
            Self::TranscriptionUnavailable(_) => "transcription_unavailable",
            Self::ChatUnavailable(_) => "chat_unavailable",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}

pub type ClauseResult<T> = Result<T, ClauseError>;
