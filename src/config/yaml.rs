use serde::Deserialize;
use std::path::PathBuf;

use super::ConfigError;
use crate::core::script::CallScript;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   public_url: "https://calls.example.com"
///
/// providers:
///   timeout_seconds: 5
///   turn_budget_seconds: 12
///   openai:
///     api_key: "sk-..."
///     chat_model: "gpt-4o-mini"
///     transcription_language: "sv"
///   elevenlabs:
///     api_key: "el-key"
///     voice_id: "21m00Tcm4TlvDq8ikWAM"
///
/// storage:
///   backend: "s3"
///   s3_bucket: "autocaller-audio"
///   s3_region: "eu-north-1"
///   s3_access_key: "access-key"
///   s3_secret_key: "secret-key"
///   url_ttl_seconds: 3600
///
/// telephony:
///   voice: "alice"
///
/// security:
///   cors_allowed_origins: "*"
///
/// script:
///   greeting: "Hej! Jag heter Emma och ringer från Autocaller."
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub providers: Option<ProvidersYaml>,
    pub storage: Option<StorageYaml>,
    pub telephony: Option<TelephonyYaml>,
    pub security: Option<SecurityYaml>,
    pub script: Option<CallScript>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Public base URL the telephony provider uses to reach this server
    pub public_url: Option<String>,
    pub tls: Option<TlsYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub timeout_seconds: Option<u64>,
    pub turn_budget_seconds: Option<u64>,
    pub openai: Option<OpenAIYaml>,
    pub elevenlabs: Option<ElevenLabsYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAIYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub transcription_model: Option<String>,
    pub transcription_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ElevenLabsYaml {
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub base_url: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYaml {
    /// "s3" or "supabase"
    pub backend: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub s3_prefix: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_bucket: Option<String>,
    pub url_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TelephonyYaml {
    pub voice: Option<String>,
    pub language: Option<String>,
    pub allow_insecure_recording_urls: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })
    }
}
