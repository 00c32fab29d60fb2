use async_trait::async_trait;
use http::Method;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, PutMode, PutOptions, PutPayload,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use super::{AudioPublisher, PublishError, PublishedAudio};
use crate::config::StorageConfig;
use crate::core::tts::AudioClip;

/// Publishes clips to an `object_store` backend and presigns GET URLs.
pub struct ObjectStorePublisher {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn Signer>,
    prefix: Option<String>,
    url_ttl: Duration,
    cache_control: String,
}

impl ObjectStorePublisher {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn Signer>,
        prefix: Option<String>,
        url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            signer,
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            cache_control: format!("max-age={}", url_ttl.as_secs()),
            url_ttl,
        }
    }

    /// S3 (or S3-compatible) backend from the storage configuration
    pub fn s3(config: &StorageConfig, timeout: Duration) -> Result<Self, PublishError> {
        let bucket = config
            .s3_bucket
            .as_deref()
            .ok_or_else(|| PublishError::Configuration("AUDIO_S3_BUCKET is not set".to_string()))?;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&config.s3_region)
            .with_client_options(ClientOptions::new().with_timeout(timeout));

        if let (Some(access_key), Some(secret_key)) =
            (config.s3_access_key.as_deref(), config.s3_secret_key.as_deref())
        {
            builder = builder
                .with_access_key_id(access_key)
                .with_secret_access_key(secret_key);
        }
        if let Some(endpoint) = config.s3_endpoint.as_deref() {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let s3 = Arc::new(
            builder
                .build()
                .map_err(|e| PublishError::Configuration(e.to_string()))?,
        );

        info!("Audio storage: s3 bucket={}", bucket);
        Ok(Self::new(
            s3.clone(),
            s3,
            config.s3_prefix.clone(),
            Duration::from_secs(config.url_ttl_seconds),
        ))
    }

    fn object_key(&self, object_name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{object_name}"),
            None => object_name.to_string(),
        }
    }
}

#[async_trait]
impl AudioPublisher for ObjectStorePublisher {
    async fn publish(
        &self,
        object_name: &str,
        clip: AudioClip,
    ) -> Result<PublishedAudio, PublishError> {
        let key = self.object_key(object_name);
        let path =
            ObjectPath::parse(&key).map_err(|e| PublishError::InvalidName(e.to_string()))?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, clip.content_type.clone().into());
        attributes.insert(Attribute::CacheControl, self.cache_control.clone().into());
        // Write-once: a name collision fails rather than replacing another turn's audio
        let options = PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        };

        let size = clip.data.len();
        self.store
            .put_opts(&path, PutPayload::from(clip.data), options)
            .await
            .map_err(|e| PublishError::Store(e.to_string()))?;
        debug!("Stored audio object {} ({} bytes)", key, size);

        let url = self
            .signer
            .signed_url(Method::GET, &path, self.url_ttl)
            .await
            .map_err(|e| PublishError::Sign(e.to_string()))?;

        Ok(PublishedAudio {
            object_name: key,
            url: url.to_string(),
            expires_at: SystemTime::now() + self.url_ttl,
        })
    }
}
