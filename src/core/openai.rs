//! Error payloads shared by the OpenAI transcription and chat endpoints.
//!
//! API Reference: https://platform.openai.com/docs/guides/error-codes

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Error response from the OpenAI API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

/// OpenAI API error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAIError {
    pub message: String,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}

/// Human-readable message for a failed OpenAI response
pub fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<OpenAIErrorResponse>(body) {
        Ok(response) => match response.error.error_type {
            Some(error_type) => format!(
                "OpenAI API error: {} ({})",
                response.error.message, error_type
            ),
            None => format!("OpenAI API error: {}", response.error.message),
        },
        Err(_) => format!("OpenAI API error ({status}): {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_structured_error() {
        let body = r#"{"error":{"message":"Invalid API key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            describe_error(StatusCode::UNAUTHORIZED, body),
            "OpenAI API error: Invalid API key (invalid_request_error)"
        );
    }

    #[test]
    fn test_describe_plain_error() {
        assert_eq!(
            describe_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "OpenAI API error (502 Bad Gateway): upstream down"
        );
    }
}
