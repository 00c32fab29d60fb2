use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::info;

use super::config::{ElevenLabsConfig, VoiceSettings};
use crate::core::tts::{AudioClip, SpeechSynthesizer, SynthesisError};

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsTTS {
    http_client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsTTS {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SynthesisError> {
        config.validate().map_err(SynthesisError::Configuration)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                SynthesisError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTTS {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, SynthesisError> {
        let body = SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: self.config.voice_settings,
        };

        let response = self
            .http_client
            .post(self.config.api_url())
            .header("xi-api-key", &self.config.api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 {
                SynthesisError::AuthenticationFailed(message)
            } else {
                SynthesisError::Provider {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Network(format!("Failed to read audio: {e}")))?;

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        info!(
            "ElevenLabs synthesis complete: {} bytes for {} characters",
            audio.len(),
            text.chars().count()
        );
        Ok(AudioClip::mpeg(audio))
    }
}
