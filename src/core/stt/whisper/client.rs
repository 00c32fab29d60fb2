use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use tracing::{debug, info, warn};

use super::config::WhisperConfig;
use super::messages::TranscriptionResponse;
use crate::core::openai::describe_error;
use crate::core::stt::{Transcriber, TranscriptionError};
use crate::utils::{is_allowed_redirect, validate_recording_url};

/// Upload limit of the transcription endpoint is 25MB; leave room for the form.
const MAX_RECORDING_BYTES: usize = 24 * 1024 * 1024;

const MAX_REDIRECTS: usize = 5;

/// Follow recording redirects only to targets the URL check would also accept.
fn recording_redirect_policy(allow_insecure: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_allowed_redirect(attempt.url(), allow_insecure) {
            attempt.follow()
        } else {
            warn!(target_url = %attempt.url(), "Refusing recording redirect (SSRF protection)");
            let refused = format!("redirect to {} refused", attempt.url());
            attempt.error(refused)
        }
    })
}

/// Transcribes telephony recordings with OpenAI Whisper.
///
/// # Example
///
/// ```rust,no_run
/// use autocaller_gateway::core::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
/// use autocaller_gateway::ServerConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = WhisperConfig::from_server_config(&ServerConfig::from_env()?);
/// let transcriber = WhisperTranscriber::new(config)?;
/// let text = transcriber
///     .transcribe("https://api.twilio.com/2010-04-01/Accounts/AC1/Recordings/RE1")
///     .await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub struct WhisperTranscriber {
    http_client: Client,
    config: WhisperConfig,
}

impl WhisperTranscriber {
    pub fn new(config: WhisperConfig) -> Result<Self, TranscriptionError> {
        config.validate().map_err(TranscriptionError::Configuration)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .redirect(recording_redirect_policy(
                config.allow_insecure_recording_urls,
            ))
            .build()
            .map_err(|e| {
                TranscriptionError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    async fn download(&self, recording_url: &str) -> Result<(Bytes, String), TranscriptionError> {
        let url =
            validate_recording_url(recording_url, self.config.allow_insecure_recording_urls)
                .await?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| TranscriptionError::Download(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptionError::Download(format!(
                "Recording fetch returned {status}"
            )));
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("audio/"))
            .unwrap_or("audio/wav")
            .to_string();

        let audio = response
            .bytes()
            .await
            .map_err(|e| TranscriptionError::Download(format!("Failed to read body: {e}")))?;

        if audio.is_empty() {
            return Err(TranscriptionError::Download("Recording is empty".to_string()));
        }
        if audio.len() > MAX_RECORDING_BYTES {
            return Err(TranscriptionError::Download(format!(
                "Recording is {} bytes, limit is {MAX_RECORDING_BYTES}",
                audio.len()
            )));
        }

        Ok((audio, mime))
    }
}

fn file_name_for(mime: &str) -> &'static str {
    match mime {
        "audio/mpeg" | "audio/mp3" => "audio.mp3",
        "audio/ogg" => "audio.ogg",
        "audio/webm" => "audio.webm",
        _ => "audio.wav",
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, recording_url: &str) -> Result<String, TranscriptionError> {
        let (audio, mime) = self.download(recording_url).await?;
        debug!("Downloaded recording: {} bytes ({})", audio.len(), mime);

        let file_part = Part::bytes(audio.to_vec())
            .file_name(file_name_for(&mime))
            .mime_str(&mime)
            .map_err(|e| TranscriptionError::Configuration(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone());
        if !self.config.language.is_empty() {
            form = form.text("language", self.config.language.clone());
        }

        let response = self
            .http_client
            .post(self.config.api_url())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| TranscriptionError::Network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = describe_error(status, &response_text);
            return Err(if status.as_u16() == 401 {
                TranscriptionError::AuthenticationFailed(message)
            } else {
                TranscriptionError::Provider(message)
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&response_text)
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let text = parsed.text.trim().to_string();
        info!("Transcription complete: {} characters", text.chars().count());
        Ok(text)
    }
}
