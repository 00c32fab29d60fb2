use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

use super::{AudioPublisher, PublishError, PublishedAudio};
use crate::config::StorageConfig;
use crate::core::tts::AudioClip;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

/// Publishes clips to a Supabase Storage bucket.
///
/// Upload: `POST {url}/storage/v1/object/{bucket}/{name}`
/// Sign:   `POST {url}/storage/v1/object/sign/{bucket}/{name}` with `{"expiresIn": secs}`
pub struct SupabasePublisher {
    http_client: Client,
    storage_url: String,
    service_key: String,
    bucket: String,
    url_ttl: Duration,
}

impl SupabasePublisher {
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self, PublishError> {
        let base_url = config
            .supabase_url
            .as_deref()
            .ok_or_else(|| PublishError::Configuration("SUPABASE_URL is not set".to_string()))?;
        let service_key = config.supabase_service_role_key.clone().ok_or_else(|| {
            PublishError::Configuration("SUPABASE_SERVICE_ROLE_KEY is not set".to_string())
        })?;

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PublishError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            storage_url: format!("{}/storage/v1", base_url.trim_end_matches('/')),
            service_key,
            bucket: config.supabase_bucket.clone(),
            url_ttl: Duration::from_secs(config.url_ttl_seconds),
        })
    }

    async fn upload(&self, object_name: &str, clip: AudioClip) -> Result<(), PublishError> {
        let url = format!("{}/object/{}/{}", self.storage_url, self.bucket, object_name);

        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .header(CONTENT_TYPE, clip.content_type)
            .header(CACHE_CONTROL, format!("max-age={}", self.url_ttl.as_secs()))
            .header("x-upsert", "false")
            .body(clip.data)
            .send()
            .await
            .map_err(|e| PublishError::Store(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Store(format!("Upload returned {status}: {body}")));
        }
        Ok(())
    }

    async fn sign(&self, object_name: &str) -> Result<String, PublishError> {
        let url = format!(
            "{}/object/sign/{}/{}",
            self.storage_url, self.bucket, object_name
        );

        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .json(&SignRequest {
                expires_in: self.url_ttl.as_secs(),
            })
            .send()
            .await
            .map_err(|e| PublishError::Sign(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Sign(format!("Sign returned {status}: {body}")));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Sign(format!("Invalid sign response: {e}")))?;

        // The API returns a path relative to the storage root
        if signed.signed_url.starts_with("http://") || signed.signed_url.starts_with("https://") {
            Ok(signed.signed_url)
        } else {
            Ok(format!(
                "{}/{}",
                self.storage_url,
                signed.signed_url.trim_start_matches('/')
            ))
        }
    }
}

#[async_trait]
impl AudioPublisher for SupabasePublisher {
    async fn publish(
        &self,
        object_name: &str,
        clip: AudioClip,
    ) -> Result<PublishedAudio, PublishError> {
        if object_name.is_empty() || object_name.contains("..") || object_name.starts_with('/') {
            return Err(PublishError::InvalidName(object_name.to_string()));
        }

        self.upload(object_name, clip).await?;
        debug!("Uploaded {} to bucket {}", object_name, self.bucket);

        let url = self.sign(object_name).await?;
        Ok(PublishedAudio {
            object_name: object_name.to_string(),
            url,
            expires_at: SystemTime::now() + self.url_ttl,
        })
    }
}
