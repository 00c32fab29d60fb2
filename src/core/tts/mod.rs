//! Text-to-speech for agent replies.
//!
//! A [`SpeechSynthesizer`] renders reply text into an audio clip that is then
//! published for the telephony network to fetch. There is no retry: on failure the
//! orchestrator has the telephony provider speak the same text with its own voice.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

pub mod elevenlabs;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsTTS, VoiceSettings};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Provider returned no audio")]
    EmptyAudio,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Speech synthesis timed out after {0:?}")]
    Timeout(Duration),
}

/// An encoded audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Bytes,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
}

impl AudioClip {
    pub fn mpeg(data: Bytes) -> Self {
        Self {
            data,
            content_type: "audio/mpeg".to_string(),
        }
    }
}

/// Converts reply text into audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, SynthesisError>;
}
