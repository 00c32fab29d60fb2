use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::config::OpenAIChatConfig;
use super::messages::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::core::llm::{DialogueError, DialogueGenerator};
use crate::core::openai::describe_error;

/// Generates replies with OpenAI Chat Completions.
///
/// Each call is a single-turn exchange: the persona as system message and the
/// caller's transcript as the only user message.
pub struct OpenAIChat {
    http_client: Client,
    config: OpenAIChatConfig,
}

impl OpenAIChat {
    pub fn new(config: OpenAIChatConfig) -> Result<Self, DialogueError> {
        config.validate().map_err(DialogueError::Configuration)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DialogueError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn build_request(&self, transcript: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(self.config.persona.clone()),
                ChatMessage::user(transcript),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl DialogueGenerator for OpenAIChat {
    async fn reply(&self, transcript: &str) -> Result<String, DialogueError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(DialogueError::EmptyTranscript);
        }

        let response = self
            .http_client
            .post(self.config.api_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(transcript))
            .send()
            .await
            .map_err(|e| DialogueError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| DialogueError::Network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = describe_error(status, &response_text);
            return Err(if status.as_u16() == 401 {
                DialogueError::AuthenticationFailed(message)
            } else {
                DialogueError::Provider(message)
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| DialogueError::InvalidResponse(e.to_string()))?;

        match parsed.first_content() {
            Some(reply) => {
                info!("Dialogue reply generated: {} characters", reply.chars().count());
                Ok(reply.to_string())
            }
            None => {
                debug!("Model returned no content, using fallback reply");
                Ok(self.config.empty_reply.clone())
            }
        }
    }
}
