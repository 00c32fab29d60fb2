use std::time::Duration;

use crate::config::ServerConfig;

/// Configuration for [`super::OpenAIChat`].
#[derive(Debug, Clone)]
pub struct OpenAIChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// System prompt sent ahead of every transcript
    pub persona: String,
    /// Reply used when the model returns no content
    pub empty_reply: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl OpenAIChatConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_chat_model.clone(),
            persona: config.script.persona.clone(),
            empty_reply: config.script.empty_reply.clone(),
            max_tokens: 150,
            temperature: 0.7,
            timeout: config.provider_timeout(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key is required for OpenAI chat".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }
}
