//! Speech-to-text over an OpenAI-compatible `/v1/audio/transcriptions` API.

use std::time::Duration;

use async_trait::async_trait;
use clausemind_config::TranscriptionSettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, TranscribeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[derive(Debug, Clone)]
pub struct WhisperClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// First retry delay; doubles per attempt, capped at 8s.
    pub backoff_ms: u64,
}

impl From<&TranscriptionSettings> for WhisperClientConfig {
    fn from(settings: &TranscriptionSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_retries: 2,
            timeout_secs: 30,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct WhisperClient {
    client: Client,
    config: WhisperClientConfig,
}

impl WhisperClient {
    pub fn new(config: WhisperClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// For testing: point the client at a mock server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .config
            .backoff_ms
            .saturating_mul(1u64 << (attempt - 1).min(16));
        Duration::from_millis(ms.min(8_000))
    }

    fn form(&self, audio: &[u8], file_name: &str) -> Form {
        let part = Part::bytes(audio.to_vec()).file_name(file_name.to_string());
        Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "json")
            .part("file", part)
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, TranscribeError> {
        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.backoff(attempt);
                tracing::warn!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying transcription");
                tokio::time::sleep(backoff).await;
            }

            let mut request = self.client.post(&url).multipart(self.form(&audio, file_name));
            if !self.config.api_key.is_empty() {
                request = request.bearer_auth(&self.config.api_key);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(TranscribeError::RequestError(e));
                }
            };

            let status = response.status();
            if status.is_success() {
                let body: TranscriptionResponse = response.json().await?;
                return Ok(body.text);
            }

            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::HttpError { status, body });
        }

        Err(TranscribeError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
