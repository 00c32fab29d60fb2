//! Configuration module for the Autocaller gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! Missing provider credentials never fail loading. Whether a turn strategy can run
//! is decided per call by [`crate::core::gate`], so the caller still hears an apology
//! instead of the server refusing to start. Malformed values (bad port, unknown
//! storage backend, relative public URL) are rejected here.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use autocaller_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

use crate::core::script::CallScript;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_ELEVENLABS_MODEL_ID: &str = "eleven_multilingual_v2";

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error("TLS is enabled but {0} is not set")]
    IncompleteTls(&'static str),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name,
            message: message.into(),
        }
    }
}

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Where synthesized audio is published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Any S3-compatible object store
    #[default]
    S3,
    /// Supabase Storage REST API
    Supabase,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Supabase => "supabase",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" | "aws" => Ok(Self::S3),
            "supabase" => Ok(Self::Supabase),
            other => Err(ConfigError::invalid(
                "STORAGE_BACKEND",
                format!("unknown backend '{other}', expected 's3' or 'supabase'"),
            )),
        }
    }
}

/// Audio storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    pub s3_bucket: Option<String>,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    /// Optional key prefix: `{prefix}/tts-...mp3`
    pub s3_prefix: Option<String>,

    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_bucket: String,

    /// Lifetime of the signed playback URL
    pub url_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            s3_bucket: None,
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_prefix: None,
            supabase_url: None,
            supabase_service_role_key: None,
            supabase_bucket: "audio".to_string(),
            url_ttl_seconds: 3600,
        }
    }
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, TLS, public URL)
/// - Provider credentials (OpenAI, ElevenLabs)
/// - Audio storage (S3 or Supabase)
/// - Telephony voice settings and the call script
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,
    /// Public base URL of this server, used for capture callbacks (APP_URL)
    pub public_url: Option<String>,

    // OpenAI (transcription + dialogue)
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_chat_model: String,
    pub openai_transcription_model: String,
    pub transcription_language: String,

    // ElevenLabs (speech synthesis)
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub elevenlabs_base_url: String,
    pub elevenlabs_model_id: String,

    /// Deadline for each external call within a turn
    pub provider_timeout_seconds: u64,
    /// Wall-clock budget for all external calls of one turn; each call gets at
    /// most what is left of it
    pub turn_budget_seconds: u64,

    pub storage: StorageConfig,

    // Telephony
    /// Built-in provider voice used by `<Say>`
    pub telephony_voice: String,
    pub telephony_language: Option<String>,
    /// Accept plain http and loopback recording URLs (local development only)
    pub allow_insecure_recording_urls: bool,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: u32,
    pub rate_limit_burst_size: u32,

    pub script: CallScript,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            public_url: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_chat_model: DEFAULT_CHAT_MODEL.to_string(),
            openai_transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            transcription_language: "sv".to_string(),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: None,
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            elevenlabs_model_id: DEFAULT_ELEVENLABS_MODEL_ID.to_string(),
            provider_timeout_seconds: 5,
            turn_budget_seconds: 12,
            storage: StorageConfig::default(),
            telephony_voice: "alice".to_string(),
            telephony_language: None,
            allow_insecure_recording_urls: false,
            cors_allowed_origins: Some("*".to_string()),
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
            script: CallScript::default(),
        }
    }
}

/// Zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.storage.s3_access_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.storage.s3_secret_key {
            secret.zeroize();
        }
        if let Some(ref mut key) = self.storage.supabase_service_role_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    ///
    /// `.env` is loaded by `main` before this runs, so its values are visible here
    /// unless overridden by the real environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = env::load_from_env()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an environment variable
    /// has an invalid format, or validation fails.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let mut config = env::load_from_env()?;
        merge::apply_yaml(&mut config, yaml_config)?;

        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }

    pub fn turn_budget(&self) -> Duration {
        Duration::from_secs(self.turn_budget_seconds)
    }

    /// Absolute URL of a route on this server, as seen by the telephony provider
    ///
    /// Returns `None` when no public URL is configured.
    pub fn callback_url(&self, route_path: &str) -> Option<String> {
        let base = self.public_url.as_deref()?.trim();
        if base.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            route_path.trim_start_matches('/')
        ))
    }
}
