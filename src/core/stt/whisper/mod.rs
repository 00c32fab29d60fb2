//! OpenAI Whisper transcription.
//!
//! REST API: the recording is downloaded in full, then posted as a multipart
//! upload to `/audio/transcriptions`.
//!
//! API Reference: https://platform.openai.com/docs/api-reference/audio/createTranscription

mod client;
mod config;
pub mod messages;

pub use client::WhisperTranscriber;
pub use config::WhisperConfig;
