use serde::Serialize;
use std::time::Duration;

use crate::config::ServerConfig;

/// Voice tuning parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// Configuration for [`super::ElevenLabsTTS`].
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    /// API root without the `/v1` suffix
    pub base_url: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.elevenlabs_api_key.clone().unwrap_or_default(),
            voice_id: config.elevenlabs_voice_id.clone().unwrap_or_default(),
            base_url: config.elevenlabs_base_url.clone(),
            model_id: config.elevenlabs_model_id.clone(),
            voice_settings: VoiceSettings::default(),
            timeout: config.provider_timeout(),
        }
    }

    pub fn api_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            self.voice_id
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key is required for ElevenLabs".to_string());
        }
        validate_voice_id(&self.voice_id)
    }
}

/// Voice IDs are interpolated into the request path, so only a safe alphabet is allowed.
fn validate_voice_id(voice_id: &str) -> Result<(), String> {
    if voice_id.is_empty() {
        return Err("voice ID must not be empty".to_string());
    }
    if voice_id.len() > 128 {
        return Err("voice ID exceeds maximum length of 128 characters".to_string());
    }
    if !voice_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "voice ID contains invalid characters (only alphanumeric, '-' and '_' allowed): {voice_id}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ElevenLabsConfig {
        let mut server = ServerConfig::default();
        server.elevenlabs_api_key = Some("el-test".to_string());
        server.elevenlabs_voice_id = Some("21m00Tcm4TlvDq8ikWAM".to_string());
        ElevenLabsConfig::from_server_config(&server)
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            config().api_url(),
            "https://api.elevenlabs.io/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"
        );
    }

    #[test]
    fn test_default_voice_settings() {
        let json = serde_json::to_value(VoiceSettings::default()).unwrap();
        assert_eq!(json["stability"], 0.5);
        assert_eq!(json["similarity_boost"], 0.75);
        assert_eq!(json["style"], 0.0);
        assert_eq!(json["use_speaker_boost"], true);
    }

    #[test]
    fn test_validate_voice_id() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.voice_id = "../../v1/user".to_string();
        assert!(bad.validate().is_err());

        bad.voice_id = String::new();
        assert!(bad.validate().is_err());

        bad.voice_id = "a".repeat(129);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_requires_key() {
        let mut config = config();
        config.api_key = " ".to_string();
        assert!(config.validate().is_err());
    }
}
