use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{ConfigError, ServerConfig, TlsConfig};

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// Overlay YAML values on a configuration built from the environment
pub(super) fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) -> Result<(), ConfigError> {
    if let Some(server) = yaml.server {
        set(&mut config.host, server.host);
        set(&mut config.port, server.port);
        set_opt(&mut config.public_url, server.public_url);

        if let Some(tls) = server.tls {
            match tls.enabled {
                Some(true) => {
                    let current = config.tls.take();
                    let cert_path = tls
                        .cert_path
                        .map(PathBuf::from)
                        .or_else(|| current.as_ref().map(|t| t.cert_path.clone()))
                        .ok_or(ConfigError::IncompleteTls("server.tls.cert_path"))?;
                    let key_path = tls
                        .key_path
                        .map(PathBuf::from)
                        .or_else(|| current.as_ref().map(|t| t.key_path.clone()))
                        .ok_or(ConfigError::IncompleteTls("server.tls.key_path"))?;
                    config.tls = Some(TlsConfig {
                        cert_path,
                        key_path,
                    });
                }
                Some(false) => config.tls = None,
                None => {}
            }
        }
    }

    if let Some(providers) = yaml.providers {
        set(
            &mut config.provider_timeout_seconds,
            providers.timeout_seconds,
        );
        set(&mut config.turn_budget_seconds, providers.turn_budget_seconds);

        if let Some(openai) = providers.openai {
            set_opt(&mut config.openai_api_key, openai.api_key);
            set(&mut config.openai_base_url, openai.base_url);
            set(&mut config.openai_chat_model, openai.chat_model);
            set(
                &mut config.openai_transcription_model,
                openai.transcription_model,
            );
            set(
                &mut config.transcription_language,
                openai.transcription_language,
            );
        }

        if let Some(elevenlabs) = providers.elevenlabs {
            set_opt(&mut config.elevenlabs_api_key, elevenlabs.api_key);
            set_opt(&mut config.elevenlabs_voice_id, elevenlabs.voice_id);
            set(&mut config.elevenlabs_base_url, elevenlabs.base_url);
            set(&mut config.elevenlabs_model_id, elevenlabs.model_id);
        }
    }

    if let Some(storage) = yaml.storage {
        if let Some(backend) = storage.backend {
            config.storage.backend = backend.parse()?;
        }
        set_opt(&mut config.storage.s3_bucket, storage.s3_bucket);
        set(&mut config.storage.s3_region, storage.s3_region);
        set_opt(&mut config.storage.s3_endpoint, storage.s3_endpoint);
        set_opt(&mut config.storage.s3_access_key, storage.s3_access_key);
        set_opt(&mut config.storage.s3_secret_key, storage.s3_secret_key);
        set_opt(&mut config.storage.s3_prefix, storage.s3_prefix);
        set_opt(&mut config.storage.supabase_url, storage.supabase_url);
        set_opt(
            &mut config.storage.supabase_service_role_key,
            storage.supabase_service_role_key,
        );
        set(&mut config.storage.supabase_bucket, storage.supabase_bucket);
        set(&mut config.storage.url_ttl_seconds, storage.url_ttl_seconds);
    }

    if let Some(telephony) = yaml.telephony {
        set(&mut config.telephony_voice, telephony.voice);
        set_opt(&mut config.telephony_language, telephony.language);
        set(
            &mut config.allow_insecure_recording_urls,
            telephony.allow_insecure_recording_urls,
        );
    }

    if let Some(security) = yaml.security {
        set_opt(
            &mut config.cors_allowed_origins,
            security.cors_allowed_origins,
        );
        set(
            &mut config.rate_limit_requests_per_second,
            security.rate_limit_requests_per_second,
        );
        set(
            &mut config.rate_limit_burst_size,
            security.rate_limit_burst_size,
        );
    }

    if let Some(script) = yaml.script {
        config.script = script;
    }

    Ok(())
}
