//! Configuration gate.
//!
//! Before any turn logic runs, the settings the active strategy needs are checked.
//! A blank value counts as missing. When anything is missing the call gets a fixed
//! apology instead of a half-working pipeline.

use crate::config::{ServerConfig, StorageBackend};
use crate::core::turn::TurnStrategy;

/// A named setting and its current value.
#[derive(Debug, Clone, Copy)]
pub struct RequiredSetting<'a> {
    pub name: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> RequiredSetting<'a> {
    pub fn new(name: &'static str, value: Option<&'a str>) -> Self {
        Self { name, value }
    }

    fn is_present(&self) -> bool {
        self.value.is_some_and(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Names of the missing settings, in declaration order
    Missing(Vec<&'static str>),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Ready, or the names of every missing setting.
pub fn check(required: &[RequiredSetting<'_>]) -> Readiness {
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|setting| !setting.is_present())
        .map(|setting| setting.name)
        .collect();

    if missing.is_empty() {
        Readiness::Ready
    } else {
        Readiness::Missing(missing)
    }
}

/// Settings a strategy cannot run without.
pub fn required_settings(
    config: &ServerConfig,
    strategy: TurnStrategy,
) -> Vec<RequiredSetting<'_>> {
    let mut required = vec![RequiredSetting::new("APP_URL", config.public_url.as_deref())];

    if strategy == TurnStrategy::Echo {
        return required;
    }

    required.extend([
        RequiredSetting::new("OPENAI_API_KEY", config.openai_api_key.as_deref()),
        RequiredSetting::new("ELEVENLABS_API_KEY", config.elevenlabs_api_key.as_deref()),
        RequiredSetting::new("ELEVENLABS_VOICE_ID", config.elevenlabs_voice_id.as_deref()),
    ]);

    let storage = &config.storage;
    match storage.backend {
        StorageBackend::S3 => required.extend([
            RequiredSetting::new("AUDIO_S3_BUCKET", storage.s3_bucket.as_deref()),
            RequiredSetting::new("AUDIO_S3_ACCESS_KEY", storage.s3_access_key.as_deref()),
            RequiredSetting::new("AUDIO_S3_SECRET_KEY", storage.s3_secret_key.as_deref()),
        ]),
        StorageBackend::Supabase => required.extend([
            RequiredSetting::new("SUPABASE_URL", storage.supabase_url.as_deref()),
            RequiredSetting::new(
                "SUPABASE_SERVICE_ROLE_KEY",
                storage.supabase_service_role_key.as_deref(),
            ),
        ]),
    }

    required
}

pub fn readiness(config: &ServerConfig, strategy: TurnStrategy) -> Readiness {
    check(&required_settings(config, strategy))
}
