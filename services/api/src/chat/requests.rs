use clausemind_common::error::ClauseError;
use serde::Deserialize;

use super::client::ChatMessage;

const MAX_MESSAGES: usize = 50;

/// `POST /api/chat` body: the conversation so far, oldest first.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// History must end with a user turn. The system prompt is server-owned,
    /// so clients may only send `user` and `assistant` roles.
    pub fn validate(&self) -> Result<(), ClauseError> {
        let Some(last) = self.messages.last() else {
            return Err(ClauseError::Validation("messages must not be empty".into()));
        };
        if self.messages.len() > MAX_MESSAGES {
            return Err(ClauseError::Validation(format!(
                "at most {MAX_MESSAGES} messages are accepted"
            )));
        }
        if let Some(bad) = self
            .messages
            .iter()
            .find(|m| m.role != "user" && m.role != "assistant")
        {
            return Err(ClauseError::Validation(format!(
                "unsupported message role `{}`",
                bad.role
            )));
        }
        if last.role != "user" || last.content.trim().is_empty() {
            return Err(ClauseError::Validation(
                "last message must be a non-empty user message".into(),
            ));
        }
        Ok(())
    }
}
