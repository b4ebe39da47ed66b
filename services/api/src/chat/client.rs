//! Advisor replies over an OpenAI-compatible `/v1/chat/completions` API.

use std::time::Duration;

use async_trait::async_trait;
use clausemind_config::ChatSettings;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// System prompt placed ahead of every conversation.
pub const ADVISOR_RULES: &str = "You are an expert insurance advisor for Indian health and life \
insurance. Answer from IRDAI guidelines and common policy terms such as exclusions, waiting \
periods and pre-existing conditions. Do not give legal advice. Reply clearly, the way a human \
advisor would.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Reply to a user/assistant history. The advisor rules are added here.
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, ChatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("completion carried no choices")]
    NoChoices,

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// First retry delay; doubles per attempt, capped at 8s.
    pub backoff_ms: u64,
}

impl From<&ChatSettings> for ChatClientConfig {
    fn from(settings: &ChatSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: 0.4,
            max_retries: 2,
            timeout_secs: 60,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Result<Self, reqwest::Error> {
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

    fn request_body<'a>(&'a self, history: &[ChatMessage]) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::new("system", ADVISOR_RULES));
        messages.extend_from_slice(history);
        CompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages,
        }
    }
}

#[async_trait]
impl ChatCompleter for ChatClient {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = self.request_body(history);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.backoff(attempt);
                tracing::warn!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying chat completion");
                tokio::time::sleep(backoff).await;
            }

            let mut request = self.client.post(&url).json(&body);
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
                    return Err(ChatError::RequestError(e));
                }
            };

            let status = response.status();
            if status.is_success() {
                let completion: CompletionResponse = response.json().await?;
                return completion
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or(ChatError::NoChoices);
            }

            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::HttpError { status, body });
        }

        Err(ChatError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
