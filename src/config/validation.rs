use url::Url;

use super::{ConfigError, ServerConfig};

/// Longest lifetime an S3 presigned URL may have (7 days)
const MAX_URL_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

pub(super) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(ref public_url) = config.public_url {
        validate_http_url("APP_URL", public_url)?;
    }
    validate_http_url("OPENAI_BASE_URL", &config.openai_base_url)?;
    validate_http_url("ELEVENLABS_BASE_URL", &config.elevenlabs_base_url)?;
    if let Some(ref endpoint) = config.storage.s3_endpoint {
        validate_http_url("AUDIO_S3_ENDPOINT", endpoint)?;
    }
    if let Some(ref supabase_url) = config.storage.supabase_url {
        validate_http_url("SUPABASE_URL", supabase_url)?;
    }

    if config.provider_timeout_seconds == 0 {
        return Err(ConfigError::invalid(
            "PROVIDER_TIMEOUT_SECONDS",
            "must be at least 1",
        ));
    }
    if config.turn_budget_seconds < config.provider_timeout_seconds {
        return Err(ConfigError::invalid(
            "TURN_BUDGET_SECONDS",
            "must be at least PROVIDER_TIMEOUT_SECONDS",
        ));
    }

    if config.storage.url_ttl_seconds == 0 || config.storage.url_ttl_seconds > MAX_URL_TTL_SECONDS
    {
        return Err(ConfigError::invalid(
            "AUDIO_URL_TTL_SECONDS",
            format!("must be between 1 and {MAX_URL_TTL_SECONDS}"),
        ));
    }

    if config.rate_limit_requests_per_second == 0 || config.rate_limit_burst_size == 0 {
        return Err(ConfigError::invalid(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            "rate and burst size must be at least 1",
        ));
    }

    Ok(())
}

/// Require an absolute http(s) URL with a host
fn validate_http_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::invalid(name, format!("'{value}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            name,
            format!("'{value}' must use http or https"),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::invalid(name, format!("'{value}' has no host")));
    }

    Ok(())
}
