//! ElevenLabs text-to-speech.
//!
//! Uses the REST endpoint `POST /v1/text-to-speech/{voice_id}` and requests MP3
//! output, which telephony `<Play>` accepts directly.
//!
//! API Reference: https://elevenlabs.io/docs/api-reference/text-to-speech/convert

mod config;
mod provider;

pub use config::{ElevenLabsConfig, VoiceSettings};
pub use provider::ElevenLabsTTS;
