//! Reply generation with a language model.
//!
//! A [`DialogueGenerator`] turns one caller transcript into one short spoken reply,
//! steered by the fixed sales persona. Failures here end the turn with an apology,
//! since there is nothing meaningful left to say.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod openai;

pub use openai::{OpenAIChat, OpenAIChatConfig};

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dialogue generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces the agent's next line from what the caller said.
#[async_trait]
pub trait DialogueGenerator: Send + Sync {
    async fn reply(&self, transcript: &str) -> Result<String, DialogueError>;
}
