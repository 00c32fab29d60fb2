//! Publishing synthesized audio.
//!
//! The telephony network plays hosted audio by fetching a URL, so every clip is
//! written to durable storage under a unique name and handed back as a signed,
//! time-limited GET URL. Objects are write-once; nothing here reads them back.
//!
//! Two backends are provided:
//! - [`ObjectStorePublisher`]: any `object_store` backend that can presign URLs (S3 and compatibles)
//! - [`SupabasePublisher`]: the Supabase Storage REST API

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::{ServerConfig, StorageBackend};
use crate::core::tts::AudioClip;

mod s3;
mod supabase;

pub use s3::ObjectStorePublisher;
pub use supabase::SupabasePublisher;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to store audio: {0}")]
    Store(String),

    #[error("Failed to sign audio URL: {0}")]
    Sign(String),

    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Audio publishing timed out after {0:?}")]
    Timeout(Duration),
}

/// A stored clip reachable by the telephony network until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAudio {
    pub object_name: String,
    pub url: String,
    pub expires_at: SystemTime,
}

/// Stores audio and returns a fetchable URL.
#[async_trait]
pub trait AudioPublisher: Send + Sync {
    async fn publish(
        &self,
        object_name: &str,
        clip: AudioClip,
    ) -> Result<PublishedAudio, PublishError>;
}

/// Unique object name for a reply clip: `tts-{call}-{unix_millis}.{ext}`
///
/// The call id is reduced to `[A-Za-z0-9_-]` since it comes from the request body.
pub fn audio_object_name(call_id: &str, content_type: &str, at: SystemTime) -> String {
    let call: String = call_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    let call = if call.is_empty() {
        "unknown".to_string()
    } else {
        call
    };
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("tts-{call}-{millis}.{}", extension_for(content_type))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        _ => "mp3",
    }
}

/// Build the publisher selected by the storage configuration.
pub fn create_audio_publisher(
    config: &ServerConfig,
) -> Result<Arc<dyn AudioPublisher>, PublishError> {
    let timeout = config.provider_timeout();
    match config.storage.backend {
        StorageBackend::S3 => Ok(Arc::new(ObjectStorePublisher::s3(
            &config.storage,
            timeout,
        )?)),
        StorageBackend::Supabase => Ok(Arc::new(SupabasePublisher::new(
            &config.storage,
            timeout,
        )?)),
    }
}
