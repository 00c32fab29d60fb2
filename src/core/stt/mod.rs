//! Speech-to-text for recorded caller audio.
//!
//! Telephony callbacks usually carry the provider's own speech recognition result.
//! When they only carry a recording URL, a [`Transcriber`] downloads the audio and
//! turns it into text. Transcription failures never end a turn: the orchestrator
//! substitutes a "not understood" transcript instead.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::utils::UrlValidationError;

pub mod whisper;

pub use whisper::{WhisperConfig, WhisperTranscriber};

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Recording URL rejected: {0}")]
    InvalidRecordingUrl(#[from] UrlValidationError),

    #[error("Failed to download recording: {0}")]
    Download(String),

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

    #[error("Transcription timed out after {0:?}")]
    Timeout(Duration),
}

/// Converts a recorded utterance into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Download the recording at `recording_url` and return the recognized text.
    ///
    /// The text may be empty when the recording contains no speech.
    async fn transcribe(&self, recording_url: &str) -> Result<String, TranscriptionError>;
}
