use serde::{Deserialize, Serialize};

/// Transcription response (json format).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_response_parse() {
        let response: TranscriptionResponse =
            serde_json::from_str(r#"{"text":"Jag är intresserad"}"#).unwrap();
        assert_eq!(response.text, "Jag är intresserad");
    }
}
