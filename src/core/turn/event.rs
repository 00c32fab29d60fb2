//! Inbound telephony callback payload.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Twilio call status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Busy,
    Failed,
    NoAnswer,
    Canceled,
    /// Anything else, including a missing status
    #[default]
    Unknown,
    Other(String),
}

impl CallStatus {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "queued" => Self::Queued,
            "initiated" => Self::Initiated,
            "ringing" => Self::Ringing,
            "in-progress" | "inprogress" => Self::InProgress,
            "completed" => Self::Completed,
            "busy" => Self::Busy,
            "failed" => Self::Failed,
            "no-answer" => Self::NoAnswer,
            "canceled" | "cancelled" => Self::Canceled,
            "" => Self::Unknown,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Initiated => "initiated",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::Failed => "failed",
            Self::NoAnswer => "no-answer",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
            Self::Other(raw) => raw,
        }
    }

    /// The caller is on the line and a turn can be taken.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Ringing | Self::InProgress)
    }

    /// The call is over; only an acknowledgement is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Busy | Self::Failed | Self::NoAnswer | Self::Canceled
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// One telephony callback.
///
/// Accepts Twilio's form field names and camelCase JSON equivalents. Every other
/// field Twilio sends (To, Direction, Confidence, ...) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallEvent {
    #[serde(rename = "CallSid", alias = "callId", alias = "callSid", default)]
    pub call_id: String,

    #[serde(rename = "From", alias = "fromNumber", alias = "from", default)]
    pub from_number: Option<String>,

    #[serde(rename = "CallStatus", alias = "status", alias = "callStatus", default)]
    pub status: CallStatus,

    #[serde(
        rename = "SpeechResult",
        alias = "recognizedSpeech",
        alias = "speechText",
        default
    )]
    pub speech_text: Option<String>,

    #[serde(rename = "RecordingUrl", alias = "recordingUrl", default)]
    pub recording_url: Option<String>,
}

impl CallEvent {
    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_form(body: &[u8]) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = url::form_urlencoded::parse(body)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        serde_json::from_value(Value::Object(fields))
    }

    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Recognized speech, if the provider supplied any.
    pub fn speech(&self) -> Option<&str> {
        non_blank(self.speech_text.as_deref())
    }

    pub fn recording(&self) -> Option<&str> {
        non_blank(self.recording_url.as_deref())
    }

    /// Whether the caller's utterance can be recovered from this event.
    pub fn has_transcript_source(&self) -> bool {
        self.speech().is_some() || self.recording().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
