use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ServerConfig, StorageBackend, TlsConfig};

/// Read a variable, treating blank values as unset
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::invalid(name, format!("'{raw}': {e}")))
        })
        .transpose()
}

fn parse_bool(name: &'static str) -> Result<Option<bool>, ConfigError> {
    var(name)
        .map(|raw| match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::invalid(name, format!("'{raw}' is not a boolean"))),
        })
        .transpose()
}

/// Build a configuration from defaults overlaid with environment variables
pub(super) fn load_from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(host) = var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_var::<u16>("PORT")? {
        config.port = port;
    }

    if parse_bool("TLS_ENABLED")?.unwrap_or(false) {
        let cert_path = var("TLS_CERT_PATH").ok_or(ConfigError::IncompleteTls("TLS_CERT_PATH"))?;
        let key_path = var("TLS_KEY_PATH").ok_or(ConfigError::IncompleteTls("TLS_KEY_PATH"))?;
        config.tls = Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        });
    }

    config.public_url = var("APP_URL");

    config.openai_api_key = var("OPENAI_API_KEY");
    if let Some(base_url) = var("OPENAI_BASE_URL") {
        config.openai_base_url = base_url;
    }
    if let Some(model) = var("OPENAI_CHAT_MODEL") {
        config.openai_chat_model = model;
    }
    if let Some(model) = var("OPENAI_TRANSCRIPTION_MODEL") {
        config.openai_transcription_model = model;
    }
    if let Some(language) = var("TRANSCRIPTION_LANGUAGE") {
        config.transcription_language = language;
    }

    config.elevenlabs_api_key = var("ELEVENLABS_API_KEY");
    config.elevenlabs_voice_id = var("ELEVENLABS_VOICE_ID");
    if let Some(base_url) = var("ELEVENLABS_BASE_URL") {
        config.elevenlabs_base_url = base_url;
    }
    if let Some(model_id) = var("ELEVENLABS_MODEL_ID") {
        config.elevenlabs_model_id = model_id;
    }

    if let Some(timeout) = parse_var::<u64>("PROVIDER_TIMEOUT_SECONDS")? {
        config.provider_timeout_seconds = timeout;
    }
    if let Some(budget) = parse_var::<u64>("TURN_BUDGET_SECONDS")? {
        config.turn_budget_seconds = budget;
    }

    if let Some(backend) = parse_var::<StorageBackend>("STORAGE_BACKEND")? {
        config.storage.backend = backend;
    }
    config.storage.s3_bucket = var("AUDIO_S3_BUCKET");
    if let Some(region) = var("AUDIO_S3_REGION") {
        config.storage.s3_region = region;
    }
    config.storage.s3_endpoint = var("AUDIO_S3_ENDPOINT");
    config.storage.s3_access_key = var("AUDIO_S3_ACCESS_KEY");
    config.storage.s3_secret_key = var("AUDIO_S3_SECRET_KEY");
    config.storage.s3_prefix = var("AUDIO_S3_PREFIX");
    config.storage.supabase_url = var("SUPABASE_URL");
    config.storage.supabase_service_role_key = var("SUPABASE_SERVICE_ROLE_KEY");
    if let Some(bucket) = var("SUPABASE_STORAGE_BUCKET") {
        config.storage.supabase_bucket = bucket;
    }
    if let Some(ttl) = parse_var::<u64>("AUDIO_URL_TTL_SECONDS")? {
        config.storage.url_ttl_seconds = ttl;
    }

    if let Some(voice) = var("TWILIO_VOICE") {
        config.telephony_voice = voice;
    }
    config.telephony_language = var("TWILIO_LANGUAGE");
    if let Some(allow) = parse_bool("ALLOW_INSECURE_RECORDING_URLS")? {
        config.allow_insecure_recording_urls = allow;
    }

    if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
        config.cors_allowed_origins = Some(origins);
    }
    if let Some(rps) = parse_var::<u32>("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = parse_var::<u32>("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}
