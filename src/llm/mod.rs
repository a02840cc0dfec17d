use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

/// Role vocabulary of the upstream chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One turn of seed history in the upstream vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

/// Errors from the upstream model client.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed stream payload: {0}")]
    Parse(String),
}

/// Incremental text fragments produced by a streamed generation.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Upstream chat model client - opens a streamed generation seeded
/// with prior history plus one new user message.
#[async_trait]
pub trait ChatModelClient: Send + Sync {
    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ChatStream, LlmError>;
}
