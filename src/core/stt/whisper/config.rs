use std::time::Duration;

use crate::config::ServerConfig;

/// Configuration for [`super::WhisperTranscriber`].
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub api_key: String,
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// ISO-639-1 language hint; empty lets the model detect it
    pub language: String,
    /// Applies to the recording download and the transcription request separately
    pub timeout: Duration,
    pub allow_insecure_recording_urls: bool,
}

impl WhisperConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_transcription_model.clone(),
            language: config.transcription_language.clone(),
            timeout: config.provider_timeout(),
            allow_insecure_recording_urls: config.allow_insecure_recording_urls,
        }
    }

    pub fn api_url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key is required for OpenAI transcription".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Transcription model must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_server_config() {
        let mut server = ServerConfig::default();
        server.openai_api_key = Some("sk-test".to_string());
        server.openai_base_url = "https://proxy.example.com/v1/".to_string();

        let config = WhisperConfig::from_server_config(&server);
        assert_eq!(config.model, "whisper-1");
        assert_eq!(config.language, "sv");
        assert_eq!(
            config.api_url(),
            "https://proxy.example.com/v1/audio/transcriptions"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key() {
        let config = WhisperConfig::from_server_config(&ServerConfig::default());
        assert!(config.validate().is_err());
    }
}
